//! Settable field values
//!
//! Some object fields are not plain data but small value objects with their
//! own identity: positions, scales, rotations and colors. A prop write onto
//! such a field never replaces the field; it either copies into it or calls
//! its setter. This keeps every alias of the field pointing at the same,
//! updated value.
//!
//! ```
//! use arbor_scene::{shared, Settable, Value, Vec3};
//!
//! let position = shared(Vec3::ZERO);
//! let alias = position.clone();
//!
//! position.borrow_mut().set(&[Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]).unwrap();
//! assert_eq!(alias.borrow().component("y"), Some(2.0));
//! ```

use crate::error::{Result, SceneError};
use crate::math::Vec3;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a settable value
pub type SettableRef = Rc<RefCell<dyn Settable>>;

/// Wrap a settable value in a fresh shared cell
pub fn shared<S: Settable>(value: S) -> SettableRef {
    Rc::new(RefCell::new(value))
}

/// Capability of field-level value objects
///
/// `set` receives the spread arguments of a prop write, `copy_from` performs
/// a structural copy from a value of the same concrete type.
pub trait Settable: fmt::Debug + 'static {
    /// Short type name used in errors and logs
    fn kind(&self) -> &'static str;

    /// Multi-argument setter
    fn set(&mut self, args: &[Value]) -> Result<()>;

    /// Structural copy from another settable.
    ///
    /// Returns `false` if `source` is not the same concrete type or the type
    /// does not support copying.
    fn copy_from(&mut self, _source: &dyn Settable) -> bool {
        false
    }

    /// Read a scalar component by name
    fn component(&self, name: &str) -> Option<f64>;

    /// Write a scalar component by name
    fn set_component(&mut self, name: &str, value: &Value) -> Result<()>;

    /// Clone into a new, independent cell
    fn duplicate(&self) -> SettableRef;

    fn as_any(&self) -> &dyn Any;
}

impl dyn Settable {
    /// Check the concrete type of a settable
    pub fn is<T: Settable>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcast to a concrete settable type
    pub fn downcast_ref<T: Settable>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Whether two settables share a concrete type
    pub fn same_type(&self, other: &dyn Settable) -> bool {
        self.as_any().type_id() == other.as_any().type_id()
    }
}

fn number_arg(kind: &'static str, value: &Value) -> Result<f32> {
    value
        .as_number()
        .map(|n| n as f32)
        .ok_or_else(|| SceneError::InvalidArguments {
            kind,
            reason: format!("expected a number, got {value:?}"),
        })
}

fn numbers<const N: usize>(kind: &'static str, args: &[Value]) -> Result<[f32; N]> {
    if args.len() != N {
        return Err(SceneError::InvalidArguments {
            kind,
            reason: format!("expected {N} numbers, got {} arguments", args.len()),
        });
    }
    let mut out = [0.0; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = number_arg(kind, arg)?;
    }
    Ok(out)
}

fn copy_same<T: Settable + Copy>(target: &mut T, source: &dyn Settable) -> bool {
    match source.downcast_ref::<T>() {
        Some(value) => {
            *target = *value;
            true
        }
        None => false,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Vec3
// ─────────────────────────────────────────────────────────────────────────────

impl Settable for Vec3 {
    fn kind(&self) -> &'static str {
        "Vec3"
    }

    /// `set(x, y, z)`, or `set(s)` for all three components
    fn set(&mut self, args: &[Value]) -> Result<()> {
        match args {
            [Value::Settable(source)] => {
                if self.copy_from(&*source.borrow()) {
                    Ok(())
                } else {
                    Err(SceneError::InvalidArguments {
                        kind: "Vec3",
                        reason: format!("cannot set from {}", source.borrow().kind()),
                    })
                }
            }
            [single] => {
                *self = Vec3::splat(number_arg("Vec3", single)?);
                Ok(())
            }
            _ => {
                let [x, y, z] = numbers::<3>("Vec3", args)?;
                *self = Vec3::new(x, y, z);
                Ok(())
            }
        }
    }

    fn copy_from(&mut self, source: &dyn Settable) -> bool {
        copy_same(self, source)
    }

    fn component(&self, name: &str) -> Option<f64> {
        match name {
            "x" => Some(self.x as f64),
            "y" => Some(self.y as f64),
            "z" => Some(self.z as f64),
            _ => None,
        }
    }

    fn set_component(&mut self, name: &str, value: &Value) -> Result<()> {
        let v = number_arg("Vec3", value)?;
        match name {
            "x" => self.x = v,
            "y" => self.y = v,
            "z" => self.z = v,
            _ => {
                return Err(SceneError::UnknownComponent {
                    kind: "Vec3",
                    component: name.to_string(),
                })
            }
        }
        Ok(())
    }

    fn duplicate(&self) -> SettableRef {
        shared(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Euler
// ─────────────────────────────────────────────────────────────────────────────

/// Rotation as Euler angles in radians (XYZ order)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Euler {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Settable for Euler {
    fn kind(&self) -> &'static str {
        "Euler"
    }

    fn set(&mut self, args: &[Value]) -> Result<()> {
        let [x, y, z] = numbers::<3>("Euler", args)?;
        *self = Euler::new(x, y, z);
        Ok(())
    }

    fn copy_from(&mut self, source: &dyn Settable) -> bool {
        copy_same(self, source)
    }

    fn component(&self, name: &str) -> Option<f64> {
        match name {
            "x" => Some(self.x as f64),
            "y" => Some(self.y as f64),
            "z" => Some(self.z as f64),
            _ => None,
        }
    }

    fn set_component(&mut self, name: &str, value: &Value) -> Result<()> {
        let v = number_arg("Euler", value)?;
        match name {
            "x" => self.x = v,
            "y" => self.y = v,
            "z" => self.z = v,
            _ => {
                return Err(SceneError::UnknownComponent {
                    kind: "Euler",
                    component: name.to_string(),
                })
            }
        }
        Ok(())
    }

    fn duplicate(&self) -> SettableRef {
        shared(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Color
// ─────────────────────────────────────────────────────────────────────────────

/// Linear RGB color with components in `0.0..=1.0`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create from a packed `0xRRGGBB` value
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Pack into `0xRRGGBB`
    pub fn to_hex(&self) -> u32 {
        let channel = |c: f32| ((c.clamp(0.0, 1.0) * 255.0).round() as u32) & 0xff;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Parse `#rrggbb`, `#rgb` or a basic color name
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix('#') {
            return match hex.len() {
                6 => u32::from_str_radix(hex, 16).ok().map(Self::from_hex),
                3 => {
                    let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
                    u32::from_str_radix(&expanded, 16).ok().map(Self::from_hex)
                }
                _ => None,
            };
        }
        let hex = match text.to_ascii_lowercase().as_str() {
            "black" => 0x000000,
            "white" => 0xffffff,
            "red" => 0xff0000,
            "green" => 0x008000,
            "lime" => 0x00ff00,
            "blue" => 0x0000ff,
            "yellow" => 0xffff00,
            "cyan" => 0x00ffff,
            "magenta" => 0xff00ff,
            "orange" => 0xffa500,
            "hotpink" => 0xff69b4,
            "gray" | "grey" => 0x808080,
            _ => return None,
        };
        Some(Self::from_hex(hex))
    }
}

impl Settable for Color {
    fn kind(&self) -> &'static str {
        "Color"
    }

    /// `set(0xRRGGBB)`, `set("#rrggbb")`, `set(color)` or `set(r, g, b)`
    fn set(&mut self, args: &[Value]) -> Result<()> {
        match args {
            [Value::Number(hex)] => {
                *self = Color::from_hex(*hex as u32);
                Ok(())
            }
            [Value::Text(text)] => {
                *self = Color::parse(text).ok_or_else(|| SceneError::InvalidArguments {
                    kind: "Color",
                    reason: format!("unrecognized color `{text}`"),
                })?;
                Ok(())
            }
            [Value::Settable(source)] => {
                if self.copy_from(&*source.borrow()) {
                    Ok(())
                } else {
                    Err(SceneError::InvalidArguments {
                        kind: "Color",
                        reason: format!("cannot set from {}", source.borrow().kind()),
                    })
                }
            }
            _ => {
                let [r, g, b] = numbers::<3>("Color", args)?;
                *self = Color::rgb(r, g, b);
                Ok(())
            }
        }
    }

    fn copy_from(&mut self, source: &dyn Settable) -> bool {
        copy_same(self, source)
    }

    fn component(&self, name: &str) -> Option<f64> {
        match name {
            "r" => Some(self.r as f64),
            "g" => Some(self.g as f64),
            "b" => Some(self.b as f64),
            _ => None,
        }
    }

    fn set_component(&mut self, name: &str, value: &Value) -> Result<()> {
        let v = number_arg("Color", value)?;
        match name {
            "r" => self.r = v,
            "g" => self.g = v,
            "b" => self.b = v,
            _ => {
                return Err(SceneError::UnknownComponent {
                    kind: "Color",
                    component: name.to_string(),
                })
            }
        }
        Ok(())
    }

    fn duplicate(&self) -> SettableRef {
        shared(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_setter_forms() {
        let mut v = Vec3::ZERO;
        v.set(&[Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]).unwrap();
        assert_eq!(v, Vec3::new(1.0, 2.0, 3.0));

        v.set(&[Value::Number(4.0)]).unwrap();
        assert_eq!(v, Vec3::splat(4.0));

        assert!(v.set(&[Value::Number(1.0), Value::Number(2.0)]).is_err());
        assert!(v.set(&["nope".into()]).is_err());
    }

    #[test]
    fn test_copy_requires_same_type() {
        let mut v = Vec3::ZERO;
        assert!(v.copy_from(&Vec3::ONE));
        assert_eq!(v, Vec3::ONE);
        assert!(!v.copy_from(&Euler::new(1.0, 2.0, 3.0)));
        assert_eq!(v, Vec3::ONE);
    }

    #[test]
    fn test_color_setter_forms() {
        let mut c = Color::BLACK;
        c.set(&[Value::Number(0xff0000 as f64)]).unwrap();
        assert_eq!(c.to_hex(), 0xff0000);

        c.set(&["#00ff00".into()]).unwrap();
        assert_eq!(c.to_hex(), 0x00ff00);

        c.set(&["hotpink".into()]).unwrap();
        assert_eq!(c.to_hex(), 0xff69b4);

        c.set(&[Value::Number(0.0), Value::Number(0.0), Value::Number(1.0)]).unwrap();
        assert_eq!(c.to_hex(), 0x0000ff);

        assert!(c.set(&["not-a-color".into()]).is_err());
    }

    #[test]
    fn test_components() {
        let mut e = Euler::default();
        e.set_component("y", &Value::Number(0.5)).unwrap();
        assert_eq!(e.component("y"), Some(0.5));
        assert!(matches!(
            e.set_component("w", &Value::Number(1.0)),
            Err(SceneError::UnknownComponent { .. })
        ));
    }

    #[test]
    fn test_shared_alias_sees_writes() {
        let cell = shared(Color::WHITE);
        let alias = Rc::clone(&cell);
        cell.borrow_mut()
            .set_component("g", &Value::Number(0.25))
            .unwrap();
        assert_eq!(alias.borrow().component("g"), Some(0.25));
        assert!(alias.borrow().is::<Color>());
    }
}

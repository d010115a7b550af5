//! Prop application
//!
//! [`apply_props`] writes the difference between two prop sets onto one
//! object. Writes follow the field they land on:
//!
//! - a **settable** field (`position`, `color`, ...) is updated in place, by
//!   structural copy when the new value has the same concrete type, else
//!   through its setter (lists are spread into the setter arguments);
//! - a path ending in a **component** of a settable (`position-x`) writes
//!   that component, leaving the settable's identity intact;
//! - anything else is a **plain assignment** on the deepest resolved object.
//!
//! Handler props (`onClick`, ...) never become fields; any change to them
//! rebuilds the object's [`HandlerTable`] from scratch.
//!
//! Every path is resolved before the first write, and settable writes run
//! on duplicates first. An invalid path or a failing setter leaves the object
//! untouched.

use crate::error::PropError;
use crate::props::{is_handler, is_reserved, Props, HANDLER_PREFIX};
use arbor_scene::{
    HandlerEvent, HandlerKind, HandlerTable, ObjectId, SceneGraph, SettableRef, Value,
};
use std::rc::Rc;

/// Separator between the segments of a prop path
pub const PATH_SEPARATOR: char = '-';

/// Where a resolved prop path lands
enum Target {
    /// A settable field, updated in place
    Settable(SettableRef),
    /// A named component of a settable field
    Component { cell: SettableRef, name: String },
    /// A plain field on an object
    Field { object: ObjectId, name: String },
}

/// Apply `new` onto `target`, diffing against `old`
///
/// A no-op when `new` is empty or shallow-identical to `old`.
pub fn apply_props(
    graph: &mut SceneGraph,
    target: ObjectId,
    new: &Props,
    old: &Props,
) -> Result<(), PropError> {
    if new.is_empty() {
        return Ok(());
    }

    let changed: Vec<(&str, &Value)> = new
        .iter()
        .filter(|(key, value)| !old.get(key).is_some_and(|prev| prev.same(value)))
        .collect();

    // A handler that disappeared also counts as a handler change
    let handler_removed = old
        .iter()
        .any(|(key, value)| is_handler(key, value) && !new.contains(key));

    if changed.is_empty() && !handler_removed {
        return Ok(());
    }
    graph.try_get(target)?;

    let mut handlers_changed = handler_removed;
    let mut writes = Vec::with_capacity(changed.len());
    for (key, value) in changed {
        if is_handler(key, value) {
            handlers_changed = true;
            continue;
        }
        if is_reserved(key) {
            continue;
        }
        writes.push((resolve(graph, target, key)?, value));
    }

    let mut staged: Vec<Staged<'_>> = Vec::new();
    let mut fields = Vec::new();
    for (slot, value) in writes {
        let (cell, component) = match slot {
            Target::Settable(cell) => (cell, None),
            Target::Component { cell, name } => (cell, Some(name)),
            Target::Field { object, name } => {
                fields.push((object, name, value));
                continue;
            }
        };
        let index = match staged.iter().position(|entry| Rc::ptr_eq(&entry.cell, &cell)) {
            Some(index) => index,
            None => {
                let scratch = cell.borrow().duplicate();
                staged.push(Staged {
                    cell,
                    scratch,
                    writes: Vec::new(),
                });
                staged.len() - 1
            }
        };
        let entry = &mut staged[index];
        write_settable(&entry.scratch, component.as_deref(), value)?;
        entry.writes.push((component, value));
    }

    // Nothing below can fail on a setter
    for entry in staged {
        entry.commit()?;
    }
    for (object, name, value) in fields {
        graph.try_get_mut(object)?.set_field(name, value.clone());
    }

    if handlers_changed {
        rebuild_handlers(graph, target, new)?;
    }
    Ok(())
}

/// Resolve a dotted path against `root`
fn resolve(graph: &SceneGraph, root: ObjectId, path: &str) -> Result<Target, PropError> {
    let invalid = |segment: &str| PropError::InvalidPath {
        path: path.to_string(),
        segment: segment.to_string(),
    };

    let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    if let Some(empty) = segments.iter().find(|s| s.is_empty()) {
        return Err(invalid(empty));
    }
    let Some((last, intermediate)) = segments.split_last() else {
        return Err(invalid(path));
    };

    let mut container = root;
    for (index, segment) in intermediate.iter().enumerate() {
        match graph.try_get(container)?.field(segment) {
            Some(Value::Object(next)) if graph.contains(*next) => container = *next,
            Some(Value::Settable(cell)) if index + 1 == intermediate.len() => {
                // Re-root onto the settable: the last segment names a component
                if cell.borrow().component(last).is_none() {
                    return Err(invalid(last));
                }
                return Ok(Target::Component {
                    cell: Rc::clone(cell),
                    name: last.to_string(),
                });
            }
            _ => return Err(invalid(segment)),
        }
    }

    match graph.try_get(container)?.field(last) {
        Some(Value::Settable(cell)) => Ok(Target::Settable(Rc::clone(cell))),
        _ => Ok(Target::Field {
            object: container,
            name: last.to_string(),
        }),
    }
}

/// Settable writes collected on a duplicate of the field value
struct Staged<'a> {
    cell: SettableRef,
    scratch: SettableRef,
    writes: Vec<(Option<String>, &'a Value)>,
}

impl Staged<'_> {
    fn commit(self) -> Result<(), PropError> {
        let copied = {
            let scratch = self.scratch.borrow();
            self.cell.borrow_mut().copy_from(&*scratch)
        };
        if !copied {
            // Types without structural copy replay the writes checked above
            for (component, value) in &self.writes {
                write_settable(&self.cell, component.as_deref(), value)?;
            }
        }
        Ok(())
    }
}

/// Write `value` into a settable, or into one of its components
fn write_settable(
    cell: &SettableRef,
    component: Option<&str>,
    value: &Value,
) -> Result<(), PropError> {
    if let Some(name) = component {
        cell.borrow_mut().set_component(name, value)?;
        return Ok(());
    }
    match value {
        Value::Settable(source) => {
            if Rc::ptr_eq(cell, source) {
                return Ok(());
            }
            let copied = {
                let source = source.borrow();
                let mut target = cell.borrow_mut();
                target.same_type(&*source) && target.copy_from(&*source)
            };
            if !copied {
                cell.borrow_mut().set(std::slice::from_ref(value))?;
            }
        }
        Value::List(items) => cell.borrow_mut().set(items)?,
        other => cell.borrow_mut().set(std::slice::from_ref(other))?,
    }
    Ok(())
}

/// Rebuild the handler table from every handler prop in `props`, then fire
/// `Update` if it is bound
fn rebuild_handlers(
    graph: &mut SceneGraph,
    target: ObjectId,
    props: &Props,
) -> Result<(), PropError> {
    let mut table = HandlerTable::new();
    for (key, value) in props.iter() {
        let Some(callback) = value.as_callback().filter(|_| key.starts_with(HANDLER_PREFIX))
        else {
            continue;
        };
        match HandlerKind::from_prop_key(key) {
            Some(kind) => table.insert(kind, Rc::clone(callback)),
            None => tracing::warn!(key, "ignoring unknown handler prop"),
        }
    }

    let update = table.get(HandlerKind::Update).cloned();
    tracing::debug!(?target, kinds = ?table.kinds(), "handlers rebuilt");

    let handlers = (!table.is_empty()).then_some(table);
    graph.try_get_mut(target)?.set_handlers(handlers);

    if let Some(update) = update {
        update(graph, &HandlerEvent::new(HandlerKind::Update, target));
    }
    Ok(())
}

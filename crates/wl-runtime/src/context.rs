use std::cell::RefCell;
use std::rc::Rc;

use wl_core::EntityId;

use crate::host::{ActionHandler, WorldView};

/// The bound execution context: the entity this program acts as, the action
/// handler that performs its side effects, and the world it queries.
///
/// Set exactly once, before the first run; rebinding fails.
pub struct ExecutionContext {
    entity: EntityId,
    handler: Rc<RefCell<dyn ActionHandler>>,
    world: Rc<dyn WorldView>,
}

impl ExecutionContext {
    pub fn new(
        entity: EntityId,
        handler: Rc<RefCell<dyn ActionHandler>>,
        world: Rc<dyn WorldView>,
    ) -> Self {
        Self {
            entity,
            handler,
            world,
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub(crate) fn handler(&self) -> &RefCell<dyn ActionHandler> {
        &self.handler
    }

    pub(crate) fn world(&self) -> &dyn WorldView {
        self.world.as_ref()
    }
}

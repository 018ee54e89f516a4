use wl_core::{EntityId, Position, ProgramError, TeamId};

/// The game-side executor of action statements.
///
/// Every action reports success or failure only; a failure (for example an
/// entity without the action points to pay for a move) is the ordinary
/// suspension signal, not an error, and the statement is retried verbatim on
/// the next run.
pub trait ActionHandler {
    fn turn(&mut self, entity: EntityId, angle: f64) -> bool;
    fn move_forward(&mut self, entity: EntityId) -> bool;
    fn jump(&mut self, entity: EntityId) -> bool;
    fn toggle_weapon(&mut self, entity: EntityId) -> bool;
    fn fire(&mut self, entity: EntityId, yield_points: u32) -> bool;
    fn print(&mut self, text: &str);
}

/// Read-only view of the game world: entity collections, the directional
/// search query, and per-entity capabilities.
///
/// Capability queries fail with a `Capability` error for entity kinds that
/// do not model the queried attribute (food has no hit points); such an
/// error is fatal to the asking program.
pub trait WorldView {
    fn worms(&self) -> Vec<EntityId>;
    fn food(&self) -> Vec<EntityId>;
    fn entities(&self) -> Vec<EntityId>;
    fn search_object(&self, origin: Position, angle: f64) -> Option<EntityId>;

    fn position(&self, entity: EntityId) -> Result<Position, ProgramError>;
    fn radius(&self, entity: EntityId) -> Result<f64, ProgramError>;
    fn direction(&self, entity: EntityId) -> Result<f64, ProgramError>;
    fn action_points(&self, entity: EntityId) -> Result<f64, ProgramError>;
    fn max_action_points(&self, entity: EntityId) -> Result<f64, ProgramError>;
    fn hit_points(&self, entity: EntityId) -> Result<f64, ProgramError>;
    fn max_hit_points(&self, entity: EntityId) -> Result<f64, ProgramError>;
    fn team(&self, entity: EntityId) -> Result<Option<TeamId>, ProgramError>;
    fn is_worm(&self, entity: EntityId) -> bool;
    fn is_food(&self, entity: EntityId) -> bool;
}

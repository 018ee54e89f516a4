//! A small scripted arena and a recording action handler shared by the
//! runtime integration tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use wl_core::{EntityId, Position, ProgramError, TeamId};
use wl_runtime::{ActionHandler, WorldView};

#[derive(Debug, Clone)]
pub enum ArenaEntity {
    Worm {
        position: Position,
        radius: f64,
        direction: f64,
        action_points: f64,
        max_action_points: f64,
        hit_points: f64,
        max_hit_points: f64,
        team: Option<TeamId>,
    },
    Food {
        position: Position,
        radius: f64,
    },
}

impl ArenaEntity {
    fn position(&self) -> Position {
        match self {
            ArenaEntity::Worm { position, .. } | ArenaEntity::Food { position, .. } => *position,
        }
    }
}

/// Deterministic fake world: a keyed set of worms and food.
#[derive(Debug, Default)]
pub struct Arena {
    entities: RefCell<BTreeMap<EntityId, ArenaEntity>>,
}

impl Arena {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn add_worm(&self, id: u64, x: f64, y: f64, direction: f64, team: Option<u64>) -> EntityId {
        let entity = EntityId(id);
        self.entities.borrow_mut().insert(
            entity,
            ArenaEntity::Worm {
                position: Position::new(x, y),
                radius: 0.25,
                direction,
                action_points: 10.0,
                max_action_points: 40.0,
                hit_points: 50.0,
                max_hit_points: 100.0,
                team: team.map(TeamId),
            },
        );
        entity
    }

    pub fn add_food(&self, id: u64, x: f64, y: f64) -> EntityId {
        let entity = EntityId(id);
        self.entities.borrow_mut().insert(
            entity,
            ArenaEntity::Food {
                position: Position::new(x, y),
                radius: 0.2,
            },
        );
        entity
    }

    fn capability_error(what: &str) -> ProgramError {
        ProgramError::capability(format!("this entity kind does not model {}", what))
    }
}

impl WorldView for Arena {
    fn worms(&self) -> Vec<EntityId> {
        self.entities
            .borrow()
            .iter()
            .filter(|(_, e)| matches!(e, ArenaEntity::Worm { .. }))
            .map(|(id, _)| *id)
            .collect()
    }

    fn food(&self) -> Vec<EntityId> {
        self.entities
            .borrow()
            .iter()
            .filter(|(_, e)| matches!(e, ArenaEntity::Food { .. }))
            .map(|(id, _)| *id)
            .collect()
    }

    fn entities(&self) -> Vec<EntityId> {
        self.entities.borrow().keys().copied().collect()
    }

    fn search_object(&self, origin: Position, angle: f64) -> Option<EntityId> {
        let mut best: Option<(EntityId, f64)> = None;
        for (id, entity) in self.entities.borrow().iter() {
            let position = entity.position();
            let dx = position.x - origin.x;
            let dy = position.y - origin.y;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance < 1e-9 {
                continue;
            }
            let bearing = dy.atan2(dx);
            let mut delta = (bearing - angle).rem_euclid(std::f64::consts::TAU);
            if delta > std::f64::consts::PI {
                delta = std::f64::consts::TAU - delta;
            }
            if delta > 0.1 {
                continue;
            }
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((*id, distance));
            }
        }
        best.map(|(id, _)| id)
    }

    fn position(&self, entity: EntityId) -> Result<Position, ProgramError> {
        self.entities
            .borrow()
            .get(&entity)
            .map(ArenaEntity::position)
            .ok_or_else(|| ProgramError::reference("unknown entity"))
    }

    fn radius(&self, entity: EntityId) -> Result<f64, ProgramError> {
        match self.entities.borrow().get(&entity) {
            Some(ArenaEntity::Worm { radius, .. }) | Some(ArenaEntity::Food { radius, .. }) => {
                Ok(*radius)
            }
            None => Err(ProgramError::reference("unknown entity")),
        }
    }

    fn direction(&self, entity: EntityId) -> Result<f64, ProgramError> {
        match self.entities.borrow().get(&entity) {
            Some(ArenaEntity::Worm { direction, .. }) => Ok(*direction),
            Some(ArenaEntity::Food { .. }) => Err(Self::capability_error("a direction")),
            None => Err(ProgramError::reference("unknown entity")),
        }
    }

    fn action_points(&self, entity: EntityId) -> Result<f64, ProgramError> {
        match self.entities.borrow().get(&entity) {
            Some(ArenaEntity::Worm { action_points, .. }) => Ok(*action_points),
            Some(ArenaEntity::Food { .. }) => Err(Self::capability_error("action points")),
            None => Err(ProgramError::reference("unknown entity")),
        }
    }

    fn max_action_points(&self, entity: EntityId) -> Result<f64, ProgramError> {
        match self.entities.borrow().get(&entity) {
            Some(ArenaEntity::Worm {
                max_action_points, ..
            }) => Ok(*max_action_points),
            Some(ArenaEntity::Food { .. }) => Err(Self::capability_error("action points")),
            None => Err(ProgramError::reference("unknown entity")),
        }
    }

    fn hit_points(&self, entity: EntityId) -> Result<f64, ProgramError> {
        match self.entities.borrow().get(&entity) {
            Some(ArenaEntity::Worm { hit_points, .. }) => Ok(*hit_points),
            Some(ArenaEntity::Food { .. }) => Err(Self::capability_error("hit points")),
            None => Err(ProgramError::reference("unknown entity")),
        }
    }

    fn max_hit_points(&self, entity: EntityId) -> Result<f64, ProgramError> {
        match self.entities.borrow().get(&entity) {
            Some(ArenaEntity::Worm { max_hit_points, .. }) => Ok(*max_hit_points),
            Some(ArenaEntity::Food { .. }) => Err(Self::capability_error("hit points")),
            None => Err(ProgramError::reference("unknown entity")),
        }
    }

    fn team(&self, entity: EntityId) -> Result<Option<TeamId>, ProgramError> {
        match self.entities.borrow().get(&entity) {
            Some(ArenaEntity::Worm { team, .. }) => Ok(*team),
            Some(ArenaEntity::Food { .. }) => Err(Self::capability_error("a team")),
            None => Err(ProgramError::reference("unknown entity")),
        }
    }

    fn is_worm(&self, entity: EntityId) -> bool {
        matches!(
            self.entities.borrow().get(&entity),
            Some(ArenaEntity::Worm { .. })
        )
    }

    fn is_food(&self, entity: EntityId) -> bool {
        matches!(
            self.entities.borrow().get(&entity),
            Some(ArenaEntity::Food { .. })
        )
    }
}

/// Records every action and print; moves succeed only while the allowance
/// lasts, so tests can force a handler-refused suspension.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    pub orientation: f64,
    pub move_attempts: u32,
    pub moves_performed: u32,
    pub moves_allowed: u32,
    pub jumps: u32,
    pub weapon_toggles: u32,
    pub shots: Vec<u32>,
    pub printed: Vec<String>,
}

impl RecordingHandler {
    pub fn shared(orientation: f64, moves_allowed: u32) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            orientation,
            moves_allowed,
            ..Self::default()
        }))
    }
}

impl ActionHandler for RecordingHandler {
    fn turn(&mut self, _entity: EntityId, angle: f64) -> bool {
        self.orientation += angle;
        true
    }

    fn move_forward(&mut self, _entity: EntityId) -> bool {
        self.move_attempts += 1;
        if self.moves_performed < self.moves_allowed {
            self.moves_performed += 1;
            true
        } else {
            false
        }
    }

    fn jump(&mut self, _entity: EntityId) -> bool {
        self.jumps += 1;
        true
    }

    fn toggle_weapon(&mut self, _entity: EntityId) -> bool {
        self.weapon_toggles += 1;
        true
    }

    fn fire(&mut self, _entity: EntityId, yield_points: u32) -> bool {
        self.shots.push(yield_points);
        true
    }

    fn print(&mut self, text: &str) {
        self.printed.push(text.to_string());
    }
}

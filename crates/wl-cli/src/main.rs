//! Demo runner: parses a worm-program file, binds it to a small scripted
//! arena and plays it turn by turn, printing every action the worm takes.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context};
use clap::Parser;
use wl_api::{
    parse_program, ActionHandler, EntityId, Position, ProgramError, TeamId, WorldView,
};

#[derive(Debug, Parser)]
#[command(name = "wl-cli")]
#[command(about = "Runs a worm-program against a demo arena")]
struct Cli {
    /// Path to the worm-program source file.
    script: PathBuf,

    /// How many turns to play at most.
    #[arg(long, default_value_t = 10)]
    turns: u32,
}

const MOVE_COST: f64 = 2.0;
const TURN_COST: f64 = 1.0;
const JUMP_COST: f64 = 5.0;

#[derive(Debug, Clone)]
struct Worm {
    position: Position,
    radius: f64,
    direction: f64,
    action_points: f64,
    max_action_points: f64,
    hit_points: f64,
    max_hit_points: f64,
    team: Option<TeamId>,
}

#[derive(Debug, Clone)]
struct Food {
    position: Position,
    radius: f64,
}

/// The scripted arena the demo worm lives in. Mutated through the action
/// handler, read through the world view; `RefCell` keeps both on one value.
#[derive(Debug, Default)]
struct DemoArena {
    worms: RefCell<BTreeMap<EntityId, Worm>>,
    food: RefCell<BTreeMap<EntityId, Food>>,
}

impl DemoArena {
    fn standard() -> Rc<Self> {
        let arena = Rc::new(Self::default());
        arena.spawn_worm(EntityId(1), 0.0, 0.0, 0.0, Some(TeamId(1)));
        arena.spawn_worm(EntityId(2), 12.0, 0.0, std::f64::consts::PI, Some(TeamId(1)));
        arena.spawn_worm(EntityId(3), 0.0, 9.0, 0.0, Some(TeamId(2)));
        arena.spawn_food(EntityId(4), 5.0, 0.0);
        arena.spawn_food(EntityId(5), 3.0, 4.0);
        arena
    }

    fn spawn_worm(&self, id: EntityId, x: f64, y: f64, direction: f64, team: Option<TeamId>) {
        self.worms.borrow_mut().insert(
            id,
            Worm {
                position: Position::new(x, y),
                radius: 0.25,
                direction,
                action_points: 12.0,
                max_action_points: 12.0,
                hit_points: 80.0,
                max_hit_points: 100.0,
                team,
            },
        );
    }

    fn spawn_food(&self, id: EntityId, x: f64, y: f64) {
        self.food.borrow_mut().insert(
            id,
            Food {
                position: Position::new(x, y),
                radius: 0.2,
            },
        );
    }

    fn refill_action_points(&self) {
        for worm in self.worms.borrow_mut().values_mut() {
            worm.action_points = worm.max_action_points;
        }
    }

    fn worm_field<T>(&self, entity: EntityId, field: impl Fn(&Worm) -> T) -> Option<T> {
        self.worms.borrow().get(&entity).map(|worm| field(worm))
    }

    /// Spend `cost` action points of the given worm, refusing if they are
    /// not available. Refusal is how the arena tells the program "not this
    /// turn"; the run suspends and retries after the next refill.
    fn spend(&self, entity: EntityId, cost: f64) -> bool {
        let mut worms = self.worms.borrow_mut();
        let Some(worm) = worms.get_mut(&entity) else {
            return false;
        };
        if worm.action_points < cost {
            return false;
        }
        worm.action_points -= cost;
        true
    }
}

impl WorldView for DemoArena {
    fn worms(&self) -> Vec<EntityId> {
        self.worms.borrow().keys().copied().collect()
    }

    fn food(&self) -> Vec<EntityId> {
        self.food.borrow().keys().copied().collect()
    }

    fn entities(&self) -> Vec<EntityId> {
        let mut all = self.worms();
        all.extend(self.food());
        all
    }

    fn search_object(&self, origin: Position, angle: f64) -> Option<EntityId> {
        let mut best: Option<(EntityId, f64)> = None;
        for (id, position) in self
            .worms
            .borrow()
            .iter()
            .map(|(id, worm)| (*id, worm.position))
            .chain(
                self.food
                    .borrow()
                    .iter()
                    .map(|(id, food)| (*id, food.position)),
            )
        {
            let dx = position.x - origin.x;
            let dy = position.y - origin.y;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance < 1e-9 {
                continue;
            }
            let mut delta = (dy.atan2(dx) - angle).rem_euclid(std::f64::consts::TAU);
            if delta > std::f64::consts::PI {
                delta = std::f64::consts::TAU - delta;
            }
            if delta > 0.15 {
                continue;
            }
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((id, distance));
            }
        }
        best.map(|(id, _)| id)
    }

    fn position(&self, entity: EntityId) -> Result<Position, ProgramError> {
        self.worm_field(entity, |worm| worm.position)
            .or_else(|| self.food.borrow().get(&entity).map(|food| food.position))
            .ok_or_else(|| ProgramError::reference("unknown entity"))
    }

    fn radius(&self, entity: EntityId) -> Result<f64, ProgramError> {
        self.worm_field(entity, |worm| worm.radius)
            .or_else(|| self.food.borrow().get(&entity).map(|food| food.radius))
            .ok_or_else(|| ProgramError::reference("unknown entity"))
    }

    fn direction(&self, entity: EntityId) -> Result<f64, ProgramError> {
        self.worm_field(entity, |worm| worm.direction)
            .ok_or_else(|| ProgramError::capability("only worms have a direction"))
    }

    fn action_points(&self, entity: EntityId) -> Result<f64, ProgramError> {
        self.worm_field(entity, |worm| worm.action_points)
            .ok_or_else(|| ProgramError::capability("only worms have action points"))
    }

    fn max_action_points(&self, entity: EntityId) -> Result<f64, ProgramError> {
        self.worm_field(entity, |worm| worm.max_action_points)
            .ok_or_else(|| ProgramError::capability("only worms have action points"))
    }

    fn hit_points(&self, entity: EntityId) -> Result<f64, ProgramError> {
        self.worm_field(entity, |worm| worm.hit_points)
            .ok_or_else(|| ProgramError::capability("only worms have hit points"))
    }

    fn max_hit_points(&self, entity: EntityId) -> Result<f64, ProgramError> {
        self.worm_field(entity, |worm| worm.max_hit_points)
            .ok_or_else(|| ProgramError::capability("only worms have hit points"))
    }

    fn team(&self, entity: EntityId) -> Result<Option<TeamId>, ProgramError> {
        self.worm_field(entity, |worm| worm.team)
            .ok_or_else(|| ProgramError::capability("only worms have a team"))
    }

    fn is_worm(&self, entity: EntityId) -> bool {
        self.worms.borrow().contains_key(&entity)
    }

    fn is_food(&self, entity: EntityId) -> bool {
        self.food.borrow().contains_key(&entity)
    }
}

/// Performs actions against the arena and narrates them on stdout.
struct NarratingHandler {
    arena: Rc<DemoArena>,
}

impl ActionHandler for NarratingHandler {
    fn turn(&mut self, entity: EntityId, angle: f64) -> bool {
        if !self.arena.spend(entity, TURN_COST) {
            return false;
        }
        let mut worms = self.arena.worms.borrow_mut();
        let worm = worms.get_mut(&entity).expect("spend checked the worm");
        worm.direction = (worm.direction + angle).rem_euclid(std::f64::consts::TAU);
        println!("  turn {:+.2} -> heading {:.2}", angle, worm.direction);
        true
    }

    fn move_forward(&mut self, entity: EntityId) -> bool {
        if !self.arena.spend(entity, MOVE_COST) {
            return false;
        }
        let mut worms = self.arena.worms.borrow_mut();
        let worm = worms.get_mut(&entity).expect("spend checked the worm");
        worm.position.x += worm.direction.cos();
        worm.position.y += worm.direction.sin();
        println!(
            "  move -> ({:.2}, {:.2})",
            worm.position.x, worm.position.y
        );
        true
    }

    fn jump(&mut self, entity: EntityId) -> bool {
        if !self.arena.spend(entity, JUMP_COST) {
            return false;
        }
        let mut worms = self.arena.worms.borrow_mut();
        let worm = worms.get_mut(&entity).expect("spend checked the worm");
        worm.position.x += 3.0 * worm.direction.cos();
        worm.position.y += 3.0 * worm.direction.sin();
        println!(
            "  jump -> ({:.2}, {:.2})",
            worm.position.x, worm.position.y
        );
        true
    }

    fn toggle_weapon(&mut self, _entity: EntityId) -> bool {
        println!("  toggleweap");
        true
    }

    fn fire(&mut self, entity: EntityId, yield_points: u32) -> bool {
        if !self.arena.spend(entity, f64::from(yield_points) / 10.0) {
            return false;
        }
        println!("  fire with yield {}", yield_points);
        true
    }

    fn print(&mut self, text: &str) {
        println!("  print: {}", text);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.script)
        .with_context(|| format!("cannot read {}", cli.script.display()))?;
    let mut program = match parse_program(&source) {
        Ok(program) => program,
        Err(errors) => {
            for error in &errors {
                match error.pos {
                    Some(pos) => eprintln!("{}: {}", pos, error),
                    None => eprintln!("{}", error),
                }
            }
            bail!("{} error(s) in {}", errors.len(), cli.script.display());
        }
    };

    let arena = DemoArena::standard();
    let me = EntityId(1);
    let handler = Rc::new(RefCell::new(NarratingHandler {
        arena: arena.clone(),
    }));
    program
        .bind(me, handler, arena.clone())
        .context("binding the program")?;

    for turn in 1..=cli.turns {
        arena.refill_action_points();
        println!("turn {}", turn);
        program.run().with_context(|| format!("turn {}", turn))?;
        if program.is_finished() {
            println!("program finished with {} budget left", program.remaining_budget());
            break;
        }
        println!("suspended, resuming next turn");
    }

    println!("final variables:");
    for (name, variable) in program.variables().iter() {
        println!("  {} = {}", name, variable.value());
    }
    Ok(())
}

//! Headless arena demo
//!
//! A player with a state machine, an attack ability, a contact cooldown and
//! health fights enemies produced by a pooled spawner. Runs a fixed number
//! of simulated frames and logs what happens (`RUST_LOG=debug` for detail).
//!
//! Usage: `playkit [config.ron|config.json]`

use std::cell::RefCell;
use std::rc::Rc;

use playkit::hecs::{Entity, World};
use playkit::prelude::*;

const DEFAULT_CONFIG: &str = r#"(
    max_health: 100.0,
    abilities: [
        (name: "slash", startup: 0.08, active: 0.12, recovery: 0.2, payload: (1.5, 0.0)),
    ],
    spawners: {
        "grunts": (rate: 0.8, jitter: 0.2, max_per_tick: Some(3), seed: Some(7)),
    },
    cooldowns: { "contact": 0.5 },
)"#;

const FRAME_DELTA: f32 = 1.0 / 60.0;
const FRAME_COUNT: u32 = 1200;
const ENEMY_DAMAGE: f32 = 12.0;
const HIT_RADIUS: f32 = 1.0;
const CONTACT_RADIUS: f32 = 0.6;
const PLAYER_SPEED: f32 = 4.0;

/// Pooled enemy, owned by the world while alive.
#[derive(Debug, Clone, Default)]
struct Enemy {
    position: Vec2,
    speed: f32,
}

/// Everything the player's state machine drives.
struct Player {
    entity: Entity,
    position: Vec2,
    facing: Vec2,
    input: InputSnapshot,
    ability: AbilityRunner,
    slash: AbilitySpec,
    health: Health,
    contact: Cooldown,
    /// Set once the current swing has connected
    swing_landed: bool,
}

/// Events raised inside component callbacks, drained into the hub each frame.
type Outbox = Rc<RefCell<Vec<GameEvent>>>;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("Demo failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), ConfigError> {
    let config = match std::env::args().nth(1) {
        Some(path) => KitConfig::load(path)?,
        None => KitConfig::from_ron_str(DEFAULT_CONFIG)?,
    };

    let slash = config
        .ability("slash")
        .cloned()
        .map_or_else(|| AbilitySpec::new("slash", 0.1, 0.1, 0.2, Vec2::X), Ok)?;
    let spawner_config = config.spawner("grunts").cloned().unwrap_or_default();
    let contact_cooldown = config.cooldown("contact").unwrap_or(0.5);

    let mut world = World::new();
    let outbox: Outbox = Rc::new(RefCell::new(Vec::new()));

    // Event hub with a logging subscriber and a scoreboard
    let mut hub = EventHub::new();
    let kills = Rc::new(RefCell::new(0_u32));
    hub.subscribe(|event: &GameEvent| match event {
        GameEvent::StateChanged { from, to, .. } => log::info!("Player: {from} -> {to}"),
        GameEvent::Died { entity } => log::info!("{entity:?} died"),
        other => log::debug!("{other:?}"),
    });
    {
        let kills = Rc::clone(&kills);
        hub.subscribe(move |event: &GameEvent| {
            if let GameEvent::AbilityPhase {
                phase: Phase::Idle, ..
            } = event
            {
                log::trace!("Swing finished, {} kills so far", kills.borrow());
            }
        });
    }

    let mut player = spawn_player(&mut world, &config, slash, contact_cooldown, &outbox);
    let mut fsm = player_machine(player.entity, &outbox);
    fsm.start("idle", &mut player);

    // Enemies come from a pool and live in the world while active
    let mut pool = ObjectPool::new(Enemy::default).with_reset(|enemy: &mut Enemy| {
        *enemy = Enemy::default();
    });
    pool.preload(8);
    let mut spawner: Spawner<Enemy, ObjectPool<Enemy>> = Spawner::new(spawner_config, pool)?;
    let mut enemies: OutletSet<Enemy> = OutletSet::new();

    let mut time = Time::new();
    for frame in 0..FRAME_COUNT {
        time.advance(FRAME_DELTA);
        let dt = time.delta_seconds();

        script_input(&mut player.input, frame);

        // Spawning
        let mut spawned = Vec::new();
        spawner.tick_with(dt, |mut enemy| {
            let side = if spawned.len() % 2 == 0 { 1.0 } else { -1.0 };
            enemy.position = player.position + Vec2::new(8.0 * side, 0.0);
            enemy.speed = 1.5;
            spawned.push(enemy);
        });
        for enemy in spawned {
            let entity = world.spawn((enemy,));
            enemies.insert(Outlet::new(entity));
            hub.queue(GameEvent::Spawned { entity });
        }

        // Player behavior
        player.ability.tick(dt);
        player.contact.tick(dt);
        fsm.update(dt, &mut player);
        if player.health.is_dead() {
            fsm.transition("dead", &mut player);
        }

        // Enemies chase, get hit, or hurt the player
        let mut slain = Vec::new();
        for outlet in enemies.iter() {
            let Some(mut enemy) = outlet.get_mut(&world) else {
                continue;
            };
            let to_player = player.position - enemy.position;
            let speed = enemy.speed;
            enemy.position += to_player.normalize_or_zero() * speed * dt;

            if player.ability.is_active() && !player.swing_landed {
                let reach = player.slash.payload.x * player.facing.x.signum();
                let hitbox = player.position + Vec2::new(reach, player.slash.payload.y);
                if enemy.position.distance(hitbox) <= HIT_RADIUS {
                    player.swing_landed = true;
                    slain.push(outlet.entity());
                    continue;
                }
            }

            if to_player.length() <= CONTACT_RADIUS && player.contact.try_use() {
                player.health.damage(ENEMY_DAMAGE);
            }
        }

        for entity in slain {
            if let Ok(enemy) = world.remove_one::<Enemy>(entity) {
                spawner.source_mut().release(enemy);
            }
            if let Err(e) = world.despawn(entity) {
                log::debug!("Despawn of {entity:?} skipped: {e}");
            }
            *kills.borrow_mut() += 1;
            hub.queue(GameEvent::Died { entity });
        }
        enemies.retain_alive(&world);

        hub.queue_all(outbox.borrow_mut().drain(..));
        hub.flush();
        player.input.begin_frame();

        if fsm.in_state("dead") {
            log::info!("Player fell on frame {frame}");
            break;
        }
    }

    log::info!(
        "Simulated {:.1}s: {} kills, {} spawned, {} enemies alive, health {:.0}/{:.0}, pool {:?}",
        time.elapsed_seconds(),
        kills.borrow(),
        spawner.total_spawned(),
        enemies.len(),
        player.health.current(),
        player.health.max(),
        spawner.source()
    );
    Ok(())
}

fn spawn_player(
    world: &mut World,
    config: &KitConfig,
    slash: AbilitySpec,
    contact_cooldown: f32,
    outbox: &Outbox,
) -> Player {
    let entity = world.spawn(());

    let ability = {
        let began = Rc::clone(outbox);
        let active = Rc::clone(outbox);
        let ended = Rc::clone(outbox);
        let phase_event = move |outbox: &Outbox, spec: &AbilitySpec, phase| {
            outbox.borrow_mut().push(GameEvent::AbilityPhase {
                entity,
                ability: spec.name.clone(),
                phase,
            });
        };
        AbilityRunner::new()
            .on_began(move |spec| phase_event(&began, spec, Phase::Startup))
            .on_active(move |spec| phase_event(&active, spec, Phase::Active))
            .on_ended(move |spec| phase_event(&ended, spec, Phase::Idle))
    };

    let health = {
        let changed = Rc::clone(outbox);
        let died = Rc::clone(outbox);
        Health::new(config.max_health)
            .on_changed(move |old, new| {
                let event = if new <= old {
                    GameEvent::Damaged { entity, old, new }
                } else {
                    GameEvent::Healed { entity, old, new }
                };
                changed.borrow_mut().push(event);
            })
            .on_died(move || died.borrow_mut().push(GameEvent::Died { entity }))
    };

    Player {
        entity,
        position: Vec2::ZERO,
        facing: Vec2::X,
        input: InputSnapshot::new(),
        ability,
        slash,
        health,
        contact: Cooldown::new(contact_cooldown),
        swing_landed: false,
    }
}

fn player_machine(entity: Entity, outbox: &Outbox) -> StateMachine<Player> {
    let changes = Rc::clone(outbox);

    StateMachine::new()
        .with_state(
            "idle",
            State::new().on_update(|player: &mut Player, _| {
                if try_attack(player) {
                    Transition::to("attack")
                } else if player.input.movement() != Vec2::ZERO {
                    Transition::to("run")
                } else {
                    Transition::None
                }
            }),
        )
        .with_state(
            "run",
            State::new().on_update(|player: &mut Player, dt| {
                if try_attack(player) {
                    return Transition::to("attack");
                }
                let dir = player.input.movement();
                if dir == Vec2::ZERO {
                    return Transition::to("idle");
                }
                if dir.x != 0.0 {
                    player.facing = Vec2::new(dir.x.signum(), 0.0);
                }
                player.position += dir * PLAYER_SPEED * dt;
                Transition::None
            }),
        )
        .with_state(
            "attack",
            State::new()
                .on_enter(|player: &mut Player| player.swing_landed = false)
                .on_update(|player: &mut Player, _| {
                    if player.ability.busy() {
                        Transition::None
                    } else {
                        Transition::to("idle")
                    }
                }),
        )
        .with_state(
            "dead",
            State::new().on_enter(|player: &mut Player| {
                player.health.set_invulnerable(true);
                player.input.clear();
            }),
        )
        .on_change(move |_, from, to| {
            changes.borrow_mut().push(GameEvent::StateChanged {
                entity,
                from: from.to_owned(),
                to: to.to_owned(),
            });
        })
}

fn try_attack(player: &mut Player) -> bool {
    player.input.is_just_pressed(InputAction::Attack) && player.ability.begin(&player.slash)
}

/// Canned input: walk right, swing periodically, back off now and then.
fn script_input(input: &mut InputSnapshot, frame: u32) {
    match frame % 240 {
        0 => input.press(InputAction::MoveRight),
        60 => input.release(InputAction::MoveRight),
        120 => input.press(InputAction::MoveLeft),
        150 => input.release(InputAction::MoveLeft),
        _ => {}
    }

    if frame % 20 == 0 {
        input.press(InputAction::Attack);
    } else if frame % 20 == 1 {
        input.release(InputAction::Attack);
    }
}

//! Interactive driver for manually stepping the combat engine tick by tick.
//!
//! Builds a two-agent encounter (player vs. a scripted opponent), then loops
//! the scheduler FSM: each pass through `selection`/`commit` prompts the
//! player with a menu of legal commands (built from the query boundary's
//! `CombatSnapshot`), applies the chosen one, and once `commit_done` drives
//! the FSM forward, prints whatever events came out of `tick_resolution` and
//! `apply_effects` before looping back to the next tick's `draw_hand`.

use std::io::{self, IsTerminal, Write};

use dialoguer::{theme::ColorfulTheme, Select};

use skirmish_data::body_plans::build_body;
use skirmish_engine::{apply_command, build_snapshot, World};
use skirmish_engine::world::Phase;
use skirmish_types::{
    Agent, AgentId, BodyPlanId, CardId, CardInstance, Command, CombatState, DrawStyle, Engagement,
    Reach, ResourcePool, Resources, Side, WeaponId,
};

const STARTER_DECK: &[&str] = &[
    "thrust", "swing", "advance", "retreat", "parry", "block", "dodge", "feint", "second_wind",
];

fn parse_seed() -> u32 {
    std::env::args()
        .position(|a| a == "--seed" || a == "-s")
        .and_then(|i| std::env::args().nth(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(42)
}

fn make_agent(world: &mut World, body_plan: &str, deck: &[&str]) -> AgentId {
    let body = build_body(&BodyPlanId::new(body_plan)).expect("known body plan");
    let instances: Vec<_> = deck
        .iter()
        .map(|card| {
            let id = world.card_instances.insert(CardInstance::new(
                skirmish_types::CardInstanceId::new(0, 0),
                CardId::new(*card),
            ));
            // re-insert with the real allocated id baked into the instance
            world.card_instances.get_mut(id).unwrap().id = id;
            id
        })
        .collect();

    let agent = Agent {
        id: AgentId::new(0, 0),
        body,
        resources: Resources {
            stamina: ResourcePool::new(10.0, 3.0),
            focus: ResourcePool::new(3.0, 1.0),
            blood: ResourcePool::new(5.0, 0.0),
            pain: 0.0,
            trauma: 0.0,
            morale: 1.0,
        },
        dominant_side: Side::Right,
        draw_style: DrawStyle::ShuffledDeck,
        deck_cards: instances,
        techniques_known: Vec::new(),
        spells_known: Vec::new(),
        inventory: Vec::new(),
        combat: Some(CombatState::new()),
        active_conditions: Vec::new(),
        reaction_slot: None,
    };
    world.agents.insert(agent)
}

fn create_duel(seed: u32) -> (World, AgentId, AgentId) {
    let mut world = World::new(seed);
    let player = make_agent(&mut world, "humanoid", STARTER_DECK);
    let foe = make_agent(&mut world, "humanoid", STARTER_DECK);

    if let Some(agent) = world.agent_mut(player) {
        agent.combat.as_mut().unwrap().equipped_weapon = Some(WeaponId::new("swords.knights_sword"));
    }
    if let Some(agent) = world.agent_mut(foe) {
        agent.combat.as_mut().unwrap().equipped_weapon = Some(WeaponId::new("swords.knights_sword"));
    }
    world.engagements.set(&player, &foe, Engagement::neutral(Reach::Sabre));

    let _ = skirmish_engine::card_registry::populate_from_deck_cards(&mut world, player);
    let _ = skirmish_engine::card_registry::populate_from_deck_cards(&mut world, foe);

    (world, player, foe)
}

fn main() {
    env_logger::init();

    println!("\n  =============================");
    println!("     S K I R M I S H   C O R E");
    println!("  =============================\n");

    let is_tty = io::stdin().is_terminal();
    let seed = if is_tty {
        print!("Enter seed (or Enter for 42): ");
        io::stdout().flush().unwrap();
        let mut input = String::new();
        io::stdin().read_line(&mut input).unwrap();
        input.trim().parse().unwrap_or(42)
    } else {
        parse_seed()
    };

    let (mut world, player, foe) = create_duel(seed);
    println!("\n  seed {seed} — player {player:?} vs. foe {foe:?}\n");

    loop {
        match world.phase {
            Phase::EncounterSummary(outcome) => {
                println!("\n  === ENCOUNTER OVER: {outcome:?} ===");
                break;
            }
            Phase::DrawHand | Phase::TickResolution | Phase::ApplyEffects | Phase::Advance => {
                let before = world.events.current().len();
                let phase = skirmish_engine::scheduler::drive(&mut world, player);
                display_events(&world, before);
                if matches!(phase, Phase::EncounterSummary(_)) {
                    continue;
                }
            }
            Phase::PlayerCardSelection | Phase::CommitPhase => {
                display_snapshot(&world, player);
                let command = match prompt_command(&world, player) {
                    Some(c) => c,
                    None => {
                        println!("\n  Goodbye!");
                        break;
                    }
                };
                if let Err(e) = apply_command(&mut world, player, command) {
                    println!("  ERROR: {e}");
                }
                run_foe_turn(&mut world, foe);
            }
        }
    }
}

/// The foe is a scripted draw-style opponent for this demo driver: it plays
/// its first affordable hand card if it has one, then immediately ends its
/// turn / commits, mirroring what a `Scripted` behaviour pattern would do.
fn run_foe_turn(world: &mut World, foe: AgentId) {
    if world.phase != Phase::PlayerCardSelection {
        return;
    }
    let snapshot = build_snapshot(world, foe);
    if let Some(status) = snapshot.cards.iter().find(|c| c.playable) {
        let _ = apply_command(
            world,
            foe,
            Command::PlayCard { card_id: status.card_id.clone(), time_start: None, target: None, modifier_of: None },
        );
    }
}

fn display_events(world: &World, skip: usize) {
    for event in world.events.current().iter().skip(skip) {
        println!("  · {event:?}");
    }
}

fn display_snapshot(world: &World, agent_id: AgentId) {
    let snapshot = build_snapshot(world, agent_id);
    println!("  ─────────────────────────────────────────");
    println!("  tick {} | phase {}", world.tick, snapshot.phase);
    println!(
        "  stamina {:.1}/{:.1}  focus {:.1}/{:.1}",
        snapshot.resources.stamina_current,
        snapshot.resources.stamina_max,
        snapshot.resources.focus_current,
        snapshot.resources.focus_max,
    );
    for enemy in &snapshot.enemies {
        println!("  foe {:?}: range {:?}{}", enemy.id, enemy.range, if enemy.is_primary { " (primary)" } else { "" });
    }
    if let Some(agent) = world.agent(agent_id) {
        println!(
            "  blood {:.1}/{:.1}  pain {:.2}  trauma {:.2}",
            agent.resources.blood.current, agent.resources.blood.max, agent.resources.pain, agent.resources.trauma
        );
        if !agent.active_conditions.is_empty() {
            let names: Vec<_> = agent.active_conditions.iter().map(|c| format!("{:?}", c.condition)).collect();
            println!("  conditions: {}", names.join(", "));
        }
    }
}

fn prompt_command(world: &World, agent_id: AgentId) -> Option<Command> {
    let snapshot = build_snapshot(world, agent_id);
    let mut options: Vec<(String, Command)> = Vec::new();

    for status in &snapshot.cards {
        if !status.playable {
            continue;
        }
        let target = if status.requires_target { world.agent_ids().into_iter().find(|&a| a != agent_id) } else { None };
        options.push((
            format!("play {} (stamina {} focus {})", status.card_id, status.cost_stamina, status.cost_focus),
            Command::PlayCard { card_id: status.card_id.clone(), time_start: None, target, modifier_of: None },
        ));
    }

    match world.phase {
        Phase::PlayerCardSelection => options.push(("end turn".into(), Command::EndTurn)),
        Phase::CommitPhase => options.push(("commit, resolve the tick".into(), Command::CommitDone)),
        _ => {}
    }

    let labels: Vec<&str> = options.iter().map(|(label, _)| label.as_str()).collect();
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("{} options", labels.len()))
        .items(&labels)
        .default(0)
        .interact_opt()
        .unwrap();

    selection.map(|idx| options[idx].1.clone())
}

//! Card template table — the playable techniques, reactions, and modifiers
//! an agent's deck is built from. Each template is a small builder function;
//! `get_card` dispatches by id across the basic/technique/reaction/spell
//! card families.

use skirmish_types::{
    CardId, CardTags, Cost, Effect, EventTag, Expression, PlayableFrom, Predicate, Rarity, Reach,
    ReachBand, Rule, TargetQuery, Technique, Template, Trigger,
};

use crate::techniques::get_technique;

pub fn get_card(id: &str) -> Option<Template> {
    match id {
        "thrust" => Some(thrust()),
        "swing" => Some(swing()),
        "advance" => Some(advance()),
        "retreat" => Some(retreat()),
        "parry" => Some(parry()),
        "block" => Some(block()),
        "dodge" => Some(dodge()),
        "feint" => Some(feint()),
        "riposte" => Some(riposte()),
        "second_wind" => Some(second_wind()),
        "precise_footing" => Some(precise_footing()),
        "battle_cry" => Some(battle_cry()),
        "throw_dagger" => Some(throw_dagger()),
        "wound_hand" => Some(wound_hand()),
        "wound_vision" => Some(wound_vision()),
        "panic" => Some(panic_card()),
        "startle_reflex" => Some(startle_reflex()),
        _ => None,
    }
}

/// Every card id this table defines, for `validate_tables`.
pub const ALL: &[&str] = &[
    "thrust",
    "swing",
    "advance",
    "retreat",
    "parry",
    "block",
    "dodge",
    "feint",
    "riposte",
    "second_wind",
    "precise_footing",
    "battle_cry",
    "throw_dagger",
    "wound_hand",
    "wound_vision",
    "panic",
    "startle_reflex",
];

fn technique_for(name: &str) -> Technique {
    get_technique(&name.into()).unwrap_or_else(|| panic!("cards.rs references unknown technique {name}"))
}

fn thrust() -> Template {
    Template {
        id: CardId::new("thrust"),
        display_name: "Thrust",
        rarity: Rarity::Common,
        cost: Cost { stamina: 2, focus: 0, time: 3 },
        tags: CardTags::OFFENSIVE | CardTags::PHASE_SELECTION | CardTags::PHASE_COMMIT,
        playable_from: PlayableFrom::HAND,
        combat_playable: true,
        technique: Some(technique_for("thrust")),
        rules: vec![],
    }
}

fn swing() -> Template {
    Template {
        id: CardId::new("swing"),
        display_name: "Swing",
        rarity: Rarity::Common,
        cost: Cost { stamina: 3, focus: 0, time: 4 },
        tags: CardTags::OFFENSIVE | CardTags::PHASE_SELECTION | CardTags::PHASE_COMMIT,
        playable_from: PlayableFrom::HAND,
        combat_playable: true,
        technique: Some(technique_for("swing")),
        rules: vec![],
    }
}

fn advance() -> Template {
    Template {
        id: CardId::new("advance"),
        display_name: "Advance",
        rarity: Rarity::Common,
        cost: Cost { stamina: 1, focus: 0, time: 3 },
        tags: CardTags::MANOEUVRE | CardTags::PHASE_SELECTION | CardTags::PHASE_COMMIT,
        playable_from: PlayableFrom::HAND,
        combat_playable: true,
        technique: Some(technique_for("advance")),
        rules: vec![Rule {
            trigger: Trigger::OnResolve,
            predicate: Predicate::Always,
            expressions: vec![Expression {
                effect: Effect::ModifyRange { steps: -1, propagate: true },
                target_query: TargetQuery::FocalEngagement,
                filter: None,
            }],
        }],
    }
}

fn retreat() -> Template {
    Template {
        id: CardId::new("retreat"),
        display_name: "Retreat",
        rarity: Rarity::Common,
        cost: Cost { stamina: 1, focus: 0, time: 3 },
        tags: CardTags::MANOEUVRE | CardTags::PHASE_SELECTION | CardTags::PHASE_COMMIT,
        playable_from: PlayableFrom::HAND,
        combat_playable: true,
        technique: Some(technique_for("retreat")),
        rules: vec![Rule {
            trigger: Trigger::OnResolve,
            predicate: Predicate::Always,
            expressions: vec![Expression {
                effect: Effect::ModifyRange { steps: 1, propagate: true },
                target_query: TargetQuery::FocalEngagement,
                filter: None,
            }],
        }],
    }
}

fn parry() -> Template {
    Template {
        id: CardId::new("parry"),
        display_name: "Parry",
        rarity: Rarity::Common,
        cost: Cost { stamina: 1, focus: 0, time: 2 },
        tags: CardTags::DEFENSIVE | CardTags::REACTION | CardTags::PHASE_SELECTION | CardTags::PHASE_COMMIT,
        playable_from: PlayableFrom::HAND,
        combat_playable: true,
        technique: Some(technique_for("parry")),
        rules: vec![],
    }
}

fn block() -> Template {
    Template {
        id: CardId::new("block"),
        display_name: "Block",
        rarity: Rarity::Common,
        cost: Cost { stamina: 1, focus: 0, time: 2 },
        tags: CardTags::DEFENSIVE | CardTags::REACTION | CardTags::PHASE_SELECTION | CardTags::PHASE_COMMIT,
        playable_from: PlayableFrom::HAND | PlayableFrom::EQUIPPED,
        combat_playable: true,
        technique: Some(technique_for("block")),
        rules: vec![],
    }
}

fn dodge() -> Template {
    Template {
        id: CardId::new("dodge"),
        display_name: "Dodge",
        rarity: Rarity::Common,
        cost: Cost { stamina: 1, focus: 0, time: 2 },
        tags: CardTags::DEFENSIVE | CardTags::REACTION | CardTags::FINESSE | CardTags::PHASE_SELECTION | CardTags::PHASE_COMMIT,
        playable_from: PlayableFrom::HAND,
        combat_playable: true,
        technique: Some(technique_for("dodge")),
        rules: vec![],
    }
}

fn feint() -> Template {
    Template {
        id: CardId::new("feint"),
        display_name: "Feint",
        rarity: Rarity::Uncommon,
        cost: Cost { stamina: 2, focus: 1, time: 3 },
        tags: CardTags::OFFENSIVE | CardTags::FINESSE | CardTags::PHASE_SELECTION | CardTags::PHASE_COMMIT,
        playable_from: PlayableFrom::HAND,
        combat_playable: true,
        technique: Some(technique_for("feint")),
        rules: vec![Rule {
            trigger: Trigger::OnPlay,
            predicate: Predicate::HasCondition { condition: skirmish_types::Condition::Blinded }.not(),
            expressions: vec![Expression {
                effect: Effect::ModifyPlay { cost_mult: None, damage_mult: Some(1.05), replace_advantage: None },
                target_query: TargetQuery::SelfTarget,
                filter: None,
            }],
        }],
    }
}

fn riposte() -> Template {
    Template {
        id: CardId::new("riposte"),
        display_name: "Riposte",
        rarity: Rarity::Uncommon,
        cost: Cost { stamina: 2, focus: 1, time: 2 },
        tags: CardTags::OFFENSIVE | CardTags::REACTION | CardTags::PRECISION | CardTags::PHASE_COMMIT,
        playable_from: PlayableFrom::HAND,
        combat_playable: true,
        technique: Some(technique_for("riposte")),
        rules: vec![Rule {
            trigger: Trigger::OnEvent { tag: EventTag::ArmourDeflected },
            predicate: Predicate::MyPlay { inner: Box::new(Predicate::Always) },
            expressions: vec![Expression {
                effect: Effect::ModifyPlay { cost_mult: None, damage_mult: Some(1.2), replace_advantage: None },
                target_query: TargetQuery::EventSource,
                filter: None,
            }],
        }],
    }
}

fn second_wind() -> Template {
    Template {
        id: CardId::new("second_wind"),
        display_name: "Second Wind",
        rarity: Rarity::Common,
        cost: Cost::FREE,
        tags: CardTags::MODIFIER | CardTags::PHASE_COMMIT,
        playable_from: PlayableFrom::HAND,
        combat_playable: true,
        technique: None,
        rules: vec![Rule {
            trigger: Trigger::OnPlay,
            predicate: Predicate::Always,
            expressions: vec![Expression {
                effect: Effect::ResourceDelta { resource: skirmish_types::Resource::Stamina, delta: 2 },
                target_query: TargetQuery::SelfTarget,
                filter: None,
            }],
        }],
    }
}

fn precise_footing() -> Template {
    Template {
        id: CardId::new("precise_footing"),
        display_name: "Precise Footing",
        rarity: Rarity::Rare,
        cost: Cost { stamina: 0, focus: 1, time: 0 },
        tags: CardTags::MODIFIER | CardTags::PRECISION | CardTags::PHASE_COMMIT,
        playable_from: PlayableFrom::HAND,
        combat_playable: true,
        technique: None,
        rules: vec![Rule {
            trigger: Trigger::OnCommit,
            predicate: Predicate::MyPlay { inner: Box::new(Predicate::HasTag { mask: CardTags::MANOEUVRE }) },
            expressions: vec![Expression {
                effect: Effect::ModifyEngagement { axis: skirmish_types::EngagementAxis::Position, delta: 0.15 },
                target_query: TargetQuery::Engagement,
                filter: None,
            }],
        }],
    }
}

fn battle_cry() -> Template {
    Template {
        id: CardId::new("battle_cry"),
        display_name: "Battle Cry",
        rarity: Rarity::Uncommon,
        cost: Cost { stamina: 1, focus: 0, time: 1 },
        tags: CardTags::MODIFIER | CardTags::INVOLUNTARY | CardTags::PHASE_SELECTION,
        playable_from: PlayableFrom::HAND,
        combat_playable: true,
        technique: None,
        rules: vec![Rule {
            trigger: Trigger::OnPlay,
            predicate: Predicate::Always,
            expressions: vec![Expression {
                effect: Effect::ModifyOverlappingPlay { damage_mult: 1.1 },
                target_query: TargetQuery::MyPlay { predicate: Box::new(Predicate::HasTag { mask: CardTags::OFFENSIVE }) },
                filter: None,
            }],
        }],
    }
}

fn throw_dagger() -> Template {
    Template {
        id: CardId::new("throw_dagger"),
        display_name: "Throw Dagger",
        rarity: Rarity::Uncommon,
        cost: Cost { stamina: 2, focus: 0, time: 2 },
        tags: CardTags::OFFENSIVE | CardTags::PHASE_SELECTION | CardTags::PHASE_COMMIT,
        playable_from: PlayableFrom::EQUIPPED | PlayableFrom::INVENTORY,
        combat_playable: true,
        technique: Some(Technique {
            attack_mode: skirmish_types::AttackMode::Thrust,
            channels: skirmish_types::Channels::OFF_HAND,
            guard_height: skirmish_types::GuardHeight::Mid,
            duration_ticks: 2,
            reach: ReachBand { min: Reach::Longsword, max: Reach::Medium },
            overlay_bonus: None,
        }),
        rules: vec![Rule {
            trigger: Trigger::OnResolve,
            predicate: Predicate::Always,
            expressions: vec![Expression {
                effect: Effect::ThrowEquipped { filter: "daggers".into() },
                target_query: TargetQuery::EquippedItem { filter: "daggers".into() },
                filter: None,
            }],
        }],
    }
}

/// A "dud" card: injected into hand by a condition-triggered rule on a
/// techniques-known card, per spec.md's physiology-to-hand feedback loop.
/// Not itself combat-playable — it occupies a hand slot without doing
/// anything, restricting what can actually be played that tick.
fn wound_hand() -> Template {
    Template {
        id: CardId::new("wound_hand"),
        display_name: "Wound: Hand",
        rarity: Rarity::Common,
        cost: Cost::FREE,
        tags: CardTags::empty(),
        playable_from: PlayableFrom::empty(),
        combat_playable: false,
        technique: None,
        rules: vec![],
    }
}

fn wound_vision() -> Template {
    Template {
        id: CardId::new("wound_vision"),
        display_name: "Wound: Vision",
        rarity: Rarity::Common,
        cost: Cost::FREE,
        tags: CardTags::empty(),
        playable_from: PlayableFrom::empty(),
        combat_playable: false,
        technique: None,
        rules: vec![],
    }
}

fn panic_card() -> Template {
    Template {
        id: CardId::new("panic"),
        display_name: "Panic",
        rarity: Rarity::Common,
        cost: Cost::FREE,
        tags: CardTags::INVOLUNTARY,
        playable_from: PlayableFrom::empty(),
        combat_playable: false,
        technique: None,
        rules: vec![Rule {
            trigger: Trigger::OnDraw,
            predicate: Predicate::Always,
            expressions: vec![Expression {
                effect: Effect::AddCondition { condition: skirmish_types::Condition::Pressured, duration: Some(1) },
                target_query: TargetQuery::SelfTarget,
                filter: None,
            }],
        }],
    }
}

/// A passive reflex, permanently known (never played, never leaves
/// `techniques_known`): reacts to its bearer's own adrenaline surge by
/// dealing the `panic` dud out of discard and into hand. The card the
/// spec's physiology-to-hand feedback loop puts the `on_event` rule on.
fn startle_reflex() -> Template {
    Template {
        id: CardId::new("startle_reflex"),
        display_name: "Startle Reflex",
        rarity: Rarity::Common,
        cost: Cost::FREE,
        tags: CardTags::INVOLUNTARY,
        playable_from: PlayableFrom::empty(),
        combat_playable: false,
        technique: None,
        rules: vec![Rule {
            trigger: Trigger::OnEvent { tag: EventTag::ConditionGained },
            predicate: Predicate::HasCondition { condition: skirmish_types::Condition::AdrenalineSurge },
            expressions: vec![Expression {
                effect: Effect::MoveCard { to: skirmish_types::Zone::Hand },
                target_query: TargetQuery::ZonedCard { zone: skirmish_types::Zone::Discard, filter: "panic".into() },
                filter: None,
            }],
        }],
    }
}

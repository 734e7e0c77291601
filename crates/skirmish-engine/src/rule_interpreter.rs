//! The rule/predicate/effect interpreter. Card behaviour is data
//! (`skirmish_types::rule`); this module is the one place that walks that
//! tree and turns it into world mutations. Adding a card never touches this
//! file — only the table in `skirmish-data`.

use skirmish_data::weapons;
use skirmish_types::{
    AgentId, CardId, CardInstanceId, CardTags, Effect, EngagementAxis, Event, EventTag,
    Expiration, Predicate, Reach, Rule, RuleContext, RuleError, TargetQuery, Trigger, Zone,
};

use crate::card_registry;
use crate::engagement_ops::modify_engagement_axis;
use crate::world::World;

/// Resolved destination for one expression: the kind of thing an effect
/// ultimately mutates. A single `target_query` only ever yields targets of
/// one kind — `apply_effect` rejects the combination otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Agent(AgentId),
    Engagement(AgentId, AgentId),
    /// A timeline slot, identified by its owner and stable slot index.
    Play { owner: AgentId, slot_index: usize },
    Item(CardInstanceId),
}

/// Accumulated effect of one `fire_rules` call. `ModifyPlay` and
/// `ModifyOverlappingPlay` don't have anywhere to mutate directly — no field
/// on `Play` stores a live multiplier — so callers (commands/resolution)
/// read the multipliers back off this struct instead and fold them into the
/// damage/cost calculation for the play in question.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectExecution {
    pub cost_mult: f32,
    pub damage_mult: f32,
    pub overlapping_damage_mult: f32,
    pub replace_advantage: Option<f32>,
    pub cancelled: bool,
}

impl Default for EffectExecution {
    fn default() -> Self {
        Self { cost_mult: 1.0, damage_mult: 1.0, overlapping_damage_mult: 1.0, replace_advantage: None, cancelled: false }
    }
}

/// Walks every rule on `instance_id`'s template matching `trigger`, evaluates
/// each rule's predicate against `ctx`, and applies the expressions of every
/// rule that fires, in template-declared order (deterministic — no rule
/// reordering happens anywhere in this path).
///
/// Validates before it mutates: target resolution and resource sufficiency
/// are checked for every expression up front, and the whole call aborts
/// without touching `world` if any of them would fail. A rule either takes
/// full effect or none of it.
pub fn fire_rules(world: &mut World, instance_id: CardInstanceId, trigger: Trigger, ctx: &RuleContext) -> Result<EffectExecution, RuleError> {
    let Some(instance) = world.card_instance(instance_id) else {
        return Ok(EffectExecution::default());
    };
    let Some(template) = skirmish_data::cards::get_card(instance.template.as_str()) else {
        return Ok(EffectExecution::default());
    };

    let mut execution = EffectExecution::default();
    for rule in &template.rules {
        if rule.trigger != trigger {
            continue;
        }
        if !evaluate_predicate(world, &rule.predicate, ctx) {
            continue;
        }
        apply_rule(world, rule, ctx, &mut execution)?;
    }
    Ok(execution)
}

fn apply_rule(world: &mut World, rule: &Rule, ctx: &RuleContext, execution: &mut EffectExecution) -> Result<(), RuleError> {
    // Pass 1: resolve every expression's targets and check feasibility
    // without mutating anything.
    let mut resolved = Vec::with_capacity(rule.expressions.len());
    for expr in &rule.expressions {
        let targets = resolve_targets(world, &expr.target_query, ctx, &expr.filter);
        if targets.is_empty() && !matches!(expr.target_query, TargetQuery::Engagement | TargetQuery::FocalEngagement) {
            return Err(RuleError::InvalidTarget);
        }
        check_feasible(world, &expr.effect, &targets)?;
        resolved.push((expr, targets));
    }

    // Pass 2: commit.
    for (expr, targets) in resolved {
        for target in targets {
            apply_effect(world, &expr.effect, target, execution);
        }
    }
    Ok(())
}

fn check_feasible(world: &World, effect: &Effect, targets: &[Target]) -> Result<(), RuleError> {
    if let Effect::ResourceDelta { resource, delta } = effect {
        if *delta < 0 {
            for target in targets {
                if let Target::Agent(agent_id) = target {
                    let Some(agent) = world.agent(*agent_id) else { continue };
                    let pool = match resource {
                        skirmish_types::Resource::Stamina => &agent.resources.stamina,
                        skirmish_types::Resource::Focus => &agent.resources.focus,
                    };
                    if pool.current + *delta as f32 + f32::EPSILON < 0.0 {
                        return Err(RuleError::InsufficientResources);
                    }
                }
            }
        }
    }
    Ok(())
}

fn apply_effect(world: &mut World, effect: &Effect, target: Target, execution: &mut EffectExecution) {
    match (effect, target) {
        (Effect::CombatTechnique { .. }, _) => {
            // Technique selection itself is read directly off the template
            // by the resolution engine; nothing to mutate here.
        }
        (Effect::ModifyPlay { cost_mult, damage_mult, replace_advantage }, _) => {
            if let Some(m) = cost_mult {
                execution.cost_mult *= m;
            }
            if let Some(m) = damage_mult {
                execution.damage_mult *= m;
            }
            if let Some(v) = replace_advantage {
                execution.replace_advantage = Some(*v);
            }
        }
        (Effect::ModifyOverlappingPlay { damage_mult }, _) => {
            execution.overlapping_damage_mult *= damage_mult;
        }
        (Effect::CancelPlay, _) => {
            execution.cancelled = true;
        }
        (Effect::ModifyRange { steps, propagate }, Target::Agent(agent_id)) => {
            let other = ctx_target_placeholder(world, agent_id);
            crate::engagement_ops::modify_range(world, agent_id, other, *steps, *propagate);
        }
        (Effect::ModifyRange { steps, .. }, Target::Engagement(a, b)) => {
            crate::engagement_ops::modify_range(world, a, Some(b), *steps, false);
        }
        (Effect::ModifyEngagement { axis, delta }, Target::Engagement(a, b)) => {
            modify_engagement_axis(world, a, b, *axis, *delta);
        }
        (Effect::ModifyEngagement { axis, delta }, Target::Agent(agent_id)) => {
            if let Some(other) = ctx_target_placeholder(world, agent_id) {
                modify_engagement_axis(world, agent_id, other, *axis, *delta);
            }
        }
        (Effect::AddCondition { condition, duration }, Target::Agent(agent_id)) => {
            if let Some(agent) = world.agent_mut(agent_id) {
                if !agent.has_condition(*condition) {
                    let expiration = duration.map(Expiration::Ticks).unwrap_or(Expiration::Dynamic);
                    agent.active_conditions.push(skirmish_types::ActiveCondition { condition: *condition, expiration });
                    world.events.emit(Event::ConditionGained { agent_id, tag: EventTag::ConditionGained });
                }
            }
        }
        (Effect::RemoveCondition { condition }, Target::Agent(agent_id)) => {
            if let Some(agent) = world.agent_mut(agent_id) {
                let before = agent.active_conditions.len();
                agent.active_conditions.retain(|c| c.condition != *condition);
                if agent.active_conditions.len() != before {
                    world.events.emit(Event::ConditionExpired { agent_id, tag: EventTag::ConditionExpired });
                }
            }
        }
        (Effect::ResourceDelta { resource, delta }, Target::Agent(agent_id)) => {
            if let Some(agent) = world.agent_mut(agent_id) {
                let pool = match resource {
                    skirmish_types::Resource::Stamina => &mut agent.resources.stamina,
                    skirmish_types::Resource::Focus => &mut agent.resources.focus,
                };
                pool.current = (pool.current + *delta as f32).clamp(0.0, pool.max);
                if *delta < 0 {
                    world.events.emit(Event::StaminaDeducted { agent_id, amount: (-*delta) as f32 });
                }
            }
        }
        (Effect::MoveCard { to }, Target::Item(instance_id)) => {
            if let Some(owner) = owner_of(world, instance_id) {
                let from = zone_of(world, owner, instance_id).unwrap_or(Zone::Hand);
                let _ = card_registry::move_between(world, owner, instance_id, from, *to);
            }
        }
        (Effect::ExhaustCard, Target::Item(instance_id)) => {
            if let Some(owner) = owner_of(world, instance_id) {
                let from = zone_of(world, owner, instance_id).unwrap_or(Zone::InPlay);
                let _ = card_registry::move_between(world, owner, instance_id, from, Zone::Exhaust);
            }
        }
        (Effect::ThrowEquipped { .. }, Target::Item(instance_id)) => {
            if let Some(owner) = owner_of(world, instance_id) {
                if let Some(from) = zone_of(world, owner, instance_id) {
                    let _ = card_registry::move_to_environment(world, owner, instance_id, from);
                }
            } else {
                // Not in a combat zone (e.g. still in inventory) — drop it
                // straight into the environment.
                world.environment.instances.push(instance_id);
            }
        }
        (Effect::EmitEvent { tag }, Target::Agent(agent_id)) => {
            world.events.emit(Event::ConditionGained { agent_id, tag: *tag });
        }
        _ => {
            // Effect/target kind mismatch (e.g. `ResourceDelta` resolved
            // against an `Engagement`). The target query that produced this
            // pairing is the bug, not this match — nothing sane to do here.
        }
    }
}

fn owner_of(world: &World, instance_id: CardInstanceId) -> Option<AgentId> {
    world.agent_ids().into_iter().find(|&id| {
        world.agent(id).map(|a| a.combat.as_ref().map(|c| c.zones.contains(instance_id)).unwrap_or(false)).unwrap_or(false)
    })
}

fn zone_of(world: &World, owner: AgentId, instance_id: CardInstanceId) -> Option<Zone> {
    let combat = world.agent(owner)?.combat.as_ref()?;
    for zone in [Zone::Draw, Zone::Hand, Zone::Discard, Zone::InPlay, Zone::Exhaust] {
        if combat.zones.list(zone).map(|l| l.contains(&instance_id)).unwrap_or(false) {
            return Some(zone);
        }
    }
    None
}

/// The acting agent's sole current engagement partner, when there's exactly
/// one (the common case — `ctx.target` is set whenever a rule is fired from
/// a context with a specific opponent in view, e.g. a played technique).
fn ctx_target_placeholder(world: &World, agent_id: AgentId) -> Option<AgentId> {
    world
        .engagements
        .iter()
        .find_map(|((a, b), _)| if *a == agent_id { Some(*b) } else if *b == agent_id { Some(*a) } else { None })
}

fn resolve_targets(world: &World, query: &TargetQuery, ctx: &RuleContext, filter: &Option<Predicate>) -> Vec<Target> {
    let candidates: Vec<Target> = match query {
        TargetQuery::SelfTarget => vec![Target::Agent(ctx.acting_agent)],
        TargetQuery::Single { predicate } => world
            .agent_ids()
            .into_iter()
            .find(|&id| evaluate_predicate_against(world, predicate, ctx, id))
            .map(Target::Agent)
            .into_iter()
            .collect(),
        TargetQuery::AllEnemies | TargetQuery::AllInRange => world
            .agent_ids()
            .into_iter()
            .filter(|&id| id != ctx.acting_agent && world.engagements.get(&ctx.acting_agent, &id).is_some())
            .map(Target::Agent)
            .collect(),
        TargetQuery::Focal => ctx
            .target
            .or_else(|| world.agent(ctx.acting_agent).and_then(|a| a.combat.as_ref()).and_then(|c| c.primary_target))
            .map(Target::Agent)
            .into_iter()
            .collect(),
        TargetQuery::EventSource => ctx.target.map(Target::Agent).into_iter().collect(),
        TargetQuery::EquippedItem { filter } => resolve_equipped(world, ctx.acting_agent, filter),
        TargetQuery::ZonedCard { zone, filter } => resolve_zoned_card(world, ctx.acting_agent, *zone, filter),
        TargetQuery::MyPlay { predicate } => resolve_plays(world, ctx.acting_agent, predicate),
        TargetQuery::OpponentPlay { predicate } => {
            ctx_target_placeholder(world, ctx.acting_agent).map(|opp| resolve_plays(world, opp, predicate)).unwrap_or_default()
        }
        TargetQuery::Engagement => ctx.target.map(|other| Target::Engagement(ctx.acting_agent, other)).into_iter().collect(),
        TargetQuery::FocalEngagement => {
            let focal = ctx
                .target
                .or_else(|| world.agent(ctx.acting_agent).and_then(|a| a.combat.as_ref()).and_then(|c| c.primary_target));
            focal.map(|other| Target::Engagement(ctx.acting_agent, other)).into_iter().collect()
        }
    };

    match filter {
        None => candidates,
        Some(predicate) => candidates
            .into_iter()
            .filter(|t| match t {
                Target::Agent(id) => evaluate_predicate_against(world, predicate, ctx, *id),
                _ => evaluate_predicate(world, predicate, ctx),
            })
            .collect(),
    }
}

fn resolve_equipped(world: &World, agent_id: AgentId, filter: &str) -> Vec<Target> {
    let Some(agent) = world.agent(agent_id) else { return Vec::new() };
    agent
        .inventory
        .iter()
        .filter(|&&instance_id| {
            world
                .card_instance(instance_id)
                .map(|inst| inst.template.as_str().contains(filter))
                .unwrap_or(false)
        })
        .map(|&id| Target::Item(id))
        .collect()
}

fn resolve_zoned_card(world: &World, agent_id: AgentId, zone: Zone, filter: &str) -> Vec<Target> {
    let Some(combat) = world.agent(agent_id).and_then(|a| a.combat.as_ref()) else { return Vec::new() };
    let Some(list) = combat.zones.list(zone) else { return Vec::new() };
    list.iter()
        .find(|&&instance_id| {
            world.card_instance(instance_id).map(|inst| inst.template.as_str().contains(filter)).unwrap_or(false)
        })
        .map(|&id| Target::Item(id))
        .into_iter()
        .collect()
}

fn resolve_plays(world: &World, owner: AgentId, predicate: &Predicate) -> Vec<Target> {
    let Some(agent) = world.agent(owner) else { return Vec::new() };
    let Some(combat) = agent.combat.as_ref() else { return Vec::new() };
    let mut out = Vec::new();
    for (index, slot) in combat.timeline.slots().iter().enumerate() {
        let Some(instance) = world.card_instance(slot.play.action) else { continue };
        let Some(template) = skirmish_data::cards::get_card(instance.template.as_str()) else { continue };
        if matches_tag_predicate(predicate, template.tags) {
            out.push(Target::Play { owner, slot_index: index });
        }
    }
    out
}

fn matches_tag_predicate(predicate: &Predicate, tags: CardTags) -> bool {
    match predicate {
        Predicate::Always => true,
        Predicate::HasTag { mask } | Predicate::CardHasTag { mask } => tags.contains(*mask),
        Predicate::Not { inner } => !matches_tag_predicate(inner, tags),
        Predicate::All { inner } => inner.iter().all(|p| matches_tag_predicate(p, tags)),
        Predicate::Any { inner } => inner.iter().any(|p| matches_tag_predicate(p, tags)),
        _ => false,
    }
}

/// Evaluates `predicate` in the context of the rule-firing agent (`ctx`).
fn evaluate_predicate(world: &World, predicate: &Predicate, ctx: &RuleContext) -> bool {
    evaluate_predicate_against(world, predicate, ctx, ctx.acting_agent)
}

/// Evaluates `predicate` as if `subject` were the acting agent — used both
/// for rule-level evaluation and for filtering candidate targets.
fn evaluate_predicate_against(world: &World, predicate: &Predicate, ctx: &RuleContext, subject: AgentId) -> bool {
    match predicate {
        Predicate::Always => true,
        Predicate::HasTag { mask } => skirmish_data::cards::get_card(ctx.originating_card.as_str())
            .map(|t| t.tags.contains(*mask))
            .unwrap_or(false),
        Predicate::CardHasTag { mask } => skirmish_data::cards::get_card(ctx.originating_card.as_str())
            .map(|t| t.tags.contains(*mask))
            .unwrap_or(false),
        Predicate::WeaponCategory { category } => equipped_weapon(world, subject)
            .map(|w| w.category == category)
            .unwrap_or(false),
        Predicate::WeaponReach { op, value } => equipped_weapon(world, subject)
            .map(|w| op.eval(w.reach.min.index() as f32, *value) || op.eval(w.reach.max.index() as f32, *value))
            .unwrap_or(false),
        Predicate::Range { op, value } => {
            let Some(other) = ctx.target.or_else(|| ctx_target_placeholder(world, subject)) else { return false };
            world.engagements.get(&subject, &other).map(|e| op.eval(reach_index(e.range), *value)).unwrap_or(false)
        }
        Predicate::AdvantageThreshold { axis, op, value } => {
            let Some(other) = ctx.target.or_else(|| ctx_target_placeholder(world, subject)) else { return false };
            world.engagements.get(&subject, &other).map(|e| op.eval(axis_value(e, *axis, subject, other), *value)).unwrap_or(false)
        }
        Predicate::HasCondition { condition } => world.agent(subject).map(|a| a.has_condition(*condition)).unwrap_or(false),
        Predicate::HasEquipped { filter } => {
            let armour_match = world
                .agent(subject)
                .map(|a| a.combat.as_ref().map(|c| c.equipped_armour.iter().any(|id| id.as_str().contains(filter.as_str()))).unwrap_or(false))
                .unwrap_or(false);
            armour_match || equipped_weapon(world, subject).map(|w| w.category.contains(filter.as_str())).unwrap_or(false)
        }
        Predicate::MyPlay { inner } => subject == ctx.acting_agent && evaluate_predicate_against(world, inner, ctx, subject),
        Predicate::OpponentPlay { inner } => {
            let Some(other) = ctx_target_placeholder(world, ctx.acting_agent) else { return false };
            subject == other && evaluate_predicate_against(world, inner, ctx, subject)
        }
        Predicate::EventCondition { tag } => ctx.event_tag == Some(*tag),
        Predicate::Not { inner } => !evaluate_predicate_against(world, inner, ctx, subject),
        Predicate::All { inner } => inner.iter().all(|p| evaluate_predicate_against(world, p, ctx, subject)),
        Predicate::Any { inner } => inner.iter().any(|p| evaluate_predicate_against(world, p, ctx, subject)),
    }
}

fn reach_index(r: Reach) -> f32 {
    r.index() as f32
}

fn axis_value(e: &skirmish_types::Engagement, axis: EngagementAxis, subject: AgentId, other: AgentId) -> f32 {
    match axis {
        EngagementAxis::Pressure => e.pressure,
        EngagementAxis::Control => e.control,
        EngagementAxis::Position => e.position,
        EngagementAxis::Balance => {
            let (first, _) = skirmish_types::canonical_pair(&subject, &other);
            if first == subject {
                e.balance_a
            } else {
                e.balance_b
            }
        }
    }
}

fn equipped_weapon(world: &World, agent_id: AgentId) -> Option<weapons::WeaponDefinition> {
    let weapon_id = world.agent(agent_id)?.combat.as_ref()?.equipped_weapon.clone()?;
    weapons::get_weapon(&weapon_id)
}

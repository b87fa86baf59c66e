//! Append-only game log.
//!
//! Each [`LogEntry`] variant carries exactly what its sentence needs; a single
//! [`LogRecord::render`] maps any entry to human-readable text.

use super::empire::EmpireName;
use super::map::AreaId;
use super::player::PlayerId;
use super::resources::{Resource, Resources, to_sentence};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// One die pair thrown during combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roll(pub u8, pub u8);

impl Roll {
    /// Sum of both dice.
    pub fn total(self) -> u8 {
        self.0 + self.1
    }
}

/// Why a combat happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatKind {
    /// Clearing an empire's home area.
    StartEmpire,
    /// Invading an occupied area.
    Invasion,
}

/// Everything the engine narrates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum LogEntry {
    Setup,
    Start { order: [PlayerId; 3] },
    StartTurn { turn: u8 },
    Collect { resource: Resource, amounts: [u32; 3] },
    CollectWorkers { amounts: [u32; 3] },
    Decline { empire: EmpireName, owner: PlayerId },
    StartEmpire { empire: EmpireName, area: AreaId, armies: u32 },
    BabylonBonus { armies: u32 },
    BuyArmies { spent: Resources, armies: u32 },
    EquipArmy { spent: Resources, empire: EmpireName },
    PlaceArmies { area: AreaId, count: u32 },
    RemoveWorkers { area: AreaId, count: u32 },
    Combat {
        kind: CombatKind,
        area: AreaId,
        defender: PlayerId,
        threshold: u8,
        rolls: Vec<Roll>,
        attacker_lost: u32,
        defender_lost: u32,
        cleared: bool,
    },
    Invade { area: AreaId, cost: u32 },
    Reinforce { area: AreaId, cost: u32 },
    DestroyCity { area: AreaId, victim: PlayerId, cost: u32 },
    PlaceWorkers { spent: Resource, count: u32, area: AreaId },
    UseScribe { from: String, to: AreaId },
    MakeTool,
    Trade { area: AreaId, gave: Resource, got: Resource },
    BuildCity { area: AreaId },
    AbandonCity { area: AreaId, built: AreaId },
    PayActionCost { paid: String },
    Pass { bid: Resources },
    AutoPass,
    NoCityExpansion,
    CityExpansion { area: AreaId, spent: Resources, points: u32 },
    OrderOfPlay { old: [PlayerId; 3], new: [PlayerId; 3], bids: [u32; 3] },
    ScoreEmpires {
        /// `(area, owner, points)` for every occupied area.
        per_area: Vec<(AreaId, PlayerId, u32)>,
        totals: [u32; 3],
        empires: [Option<EmpireName>; 3],
    },
    EndOfTurn,
    EndGameScoring { awards: Vec<(AreaId, PlayerId, u32)> },
    AnnounceWinners { winners: Vec<PlayerId> },
    Admin { what: String },
}

/// A log entry stamped with when and by whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct LogRecord {
    turn: u8,
    round: u32,
    /// Originating player, if the event belongs to one.
    player: Option<PlayerId>,
    entry: LogEntry,
}

impl LogRecord {
    /// Stamps an entry.
    pub fn new(turn: u8, round: u32, player: Option<PlayerId>, entry: LogEntry) -> Self {
        Self {
            turn,
            round,
            player,
            entry,
        }
    }

    /// Renders the entry; `names` are indexed by player id.
    pub fn render(&self, names: &[String; 3]) -> String {
        let name = |p: PlayerId| names[p.index()].as_str();
        let actor = self.player.map(name).unwrap_or("The game");
        let seq = |ids: &[PlayerId]| {
            let v: Vec<&str> = ids.iter().map(|&p| name(p)).collect();
            to_sentence(&v)
        };

        match &self.entry {
            LogEntry::Setup => format!(
                "{} received 1 wood, 1 metal, 1 tool, 1 oil, 1 gold, and 2 workers.",
                actor
            ),
            LogEntry::Start { order } => format!(
                "Good luck {}, {}, and {}.  Have fun.",
                name(order[0]),
                name(order[1]),
                name(order[2])
            ),
            LogEntry::StartTurn { turn } => format!("Starting Turn {}", turn),
            LogEntry::Collect { resource, amounts } => per_player(names, amounts, |n, c| {
                format!("{} received {} {}.", n, c, resource)
            }),
            LogEntry::CollectWorkers { amounts } => per_player(names, amounts, |n, c| {
                format!("{} received {} workers.", n, c)
            }),
            LogEntry::Decline { empire, owner } => {
                format!("The {} empire of {} declined.", empire, name(*owner))
            }
            LogEntry::StartEmpire {
                empire,
                area,
                armies,
            } => format!(
                "{} started the {} empire and received {} armies for starting empire in {}.",
                actor, empire, armies, area
            ),
            LogEntry::BabylonBonus { armies } => {
                format!("{} received {} armies for city in Babylon.", actor, armies)
            }
            LogEntry::BuyArmies { spent, armies } => {
                if spent.is_empty() {
                    format!("{} bought no additional armies.", actor)
                } else {
                    format!(
                        "{} spent {} to buy {} additional armies.",
                        actor,
                        spent.describe(),
                        armies
                    )
                }
            }
            LogEntry::EquipArmy { spent, empire } => {
                if spent.is_empty() {
                    format!("{} did not equip the {} army.", actor, empire)
                } else {
                    format!(
                        "{} equipped the {} army with {}.",
                        actor,
                        empire,
                        spent.describe()
                    )
                }
            }
            LogEntry::PlaceArmies { area, count } => {
                let noun = if *count == 1 { "army" } else { "armies" };
                format!("{} placed {} {} in {}.", actor, count, noun, area)
            }
            LogEntry::RemoveWorkers { area, count } => {
                format!("{} removed {} workers from {}.", actor, count, area)
            }
            LogEntry::Combat {
                kind,
                area,
                defender,
                threshold,
                rolls,
                attacker_lost,
                defender_lost,
                cleared,
            } => {
                let verb = match kind {
                    CombatKind::StartEmpire => "attacked",
                    CombatKind::Invasion => "invaded",
                };
                let totals: Vec<String> = rolls.iter().map(|r| r.total().to_string()).collect();
                let outcome = if *cleared {
                    format!("and drove {} out", name(*defender))
                } else {
                    "and was repelled".to_string()
                };
                format!(
                    "{} {} {} needing {}: rolled {}; lost {} armies, destroyed {}, {}.",
                    actor,
                    verb,
                    area,
                    threshold,
                    to_sentence(&totals),
                    attacker_lost,
                    defender_lost,
                    outcome
                )
            }
            LogEntry::Invade { area, cost } => {
                format!("{} invaded {} at a cost of {} armies.", actor, area, cost)
            }
            LogEntry::Reinforce { area, cost } => format!(
                "{} reinforced the army in {} at a cost of {} armies.",
                actor, area, cost
            ),
            LogEntry::DestroyCity { area, victim, cost } => format!(
                "{} destroyed the city of {} in {} at a cost of {} armies.",
                actor,
                name(*victim),
                area,
                cost
            ),
            LogEntry::PlaceWorkers { spent, count, area } => {
                format!("{} spent {} to place {} workers in {}.", actor, spent, count, area)
            }
            LogEntry::UseScribe { from, to } => {
                format!("{} used scribe to move worker from {} to {}.", actor, from, to)
            }
            LogEntry::MakeTool => format!("{} used tool maker to convert 1 metal to 1 tool.", actor),
            LogEntry::Trade { area, gave, got } => {
                format!("{} traded 1 {} for 1 {} in {}.", actor, gave, got, area)
            }
            LogEntry::BuildCity { area } => format!("{} built a city in {}.", actor, area),
            LogEntry::AbandonCity { area, built } => format!(
                "{} abandoned the city in {} to build a city in {}.",
                actor, area, built
            ),
            LogEntry::PayActionCost { paid } => {
                format!("{} paid {} to perform an action.", actor, paid)
            }
            LogEntry::Pass { bid } => {
                if bid.is_empty() {
                    format!("{} passed with a turn order bid of 0.", actor)
                } else {
                    format!(
                        "{} passed and spent {} for a turn order bid of {}.",
                        actor,
                        bid.describe(),
                        bid.bid_value()
                    )
                }
            }
            LogEntry::AutoPass => format!("The system auto passed for {}.", actor),
            LogEntry::NoCityExpansion => format!("{} decided to forgo city expansion.", actor),
            LogEntry::CityExpansion {
                area,
                spent,
                points,
            } => format!(
                "{} spent {} to expand city in {} and scored {} points.",
                actor,
                spent.describe(),
                area,
                points
            ),
            LogEntry::OrderOfPlay { old, new, bids } => {
                let mut lines = vec![format!("Current Turn Order: {}.", seq(old))];
                for &p in old {
                    lines.push(format!(
                        "{} placed a turn order bid of {}.",
                        name(p),
                        bids[p.index()]
                    ));
                }
                lines.push(format!("New Turn Order: {}.", seq(new)));
                lines.join("\n")
            }
            LogEntry::ScoreEmpires {
                per_area,
                totals,
                empires,
            } => per_area
                .iter()
                .map(|(area, owner, points)| {
                    format!("{}: {} points to {}.", area, points, name(*owner))
                })
                .chain(PlayerId::all().iter().map(|&p| match empires[p.index()] {
                    Some(e) => format!(
                        "{} scored {} points for the {} empire.",
                        name(p),
                        totals[p.index()],
                        e
                    ),
                    None => format!("{} did not have an empire to score.", name(p)),
                }))
                .collect::<Vec<_>>()
                .join("\n"),
            LogEntry::EndOfTurn => "Armies and workers returned to supply.".to_string(),
            LogEntry::EndGameScoring { awards } => {
                if awards.is_empty() {
                    return "No one scored points for their workers.".to_string();
                }
                let mut totals = [0u32; 3];
                for (_, p, pts) in awards {
                    totals[p.index()] += pts;
                }
                per_player(names, &totals, |n, c| {
                    format!("{} scored {} points for Workers.", n, c)
                })
            }
            LogEntry::AnnounceWinners { winners } => {
                format!("Congratulations to: {}.", seq(winners))
            }
            LogEntry::Admin { what } => format!("Admin updated {}.", what),
        }
    }
}

fn per_player(names: &[String; 3], amounts: &[u32; 3], line: impl Fn(&str, u32) -> String) -> String {
    PlayerId::all()
        .iter()
        .map(|&p| line(&names[p.index()], amounts[p.index()]))
        .collect::<Vec<_>>()
        .join("\n")
}

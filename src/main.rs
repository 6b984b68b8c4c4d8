use hashbrown::HashMap;
use tokio::sync::mpsc;
use tracing::{info, warn, Level};
use uuid::Uuid;

use survival_royale_server::config::ArenaConfig;
use survival_royale_server::game::arena::Arena;
use survival_royale_server::game::notify::{Notification, Notifier};
use survival_royale_server::game::state::Class;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    info!("Survival Royale Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = ArenaConfig::load_or_default();
    config.validate().map_err(anyhow::Error::msg)?;
    info!(
        "Configuration loaded: round_window={}s, min_players={}",
        config.round_window.as_secs(),
        config.min_players
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let arena = Arena::new(config, Notifier::new(tx));

    // Scripted demo roster standing in for a chat host
    let roster = [
        ("Aldric", Class::Warrior),
        ("Morgana", Class::Mage),
        ("Sylvan", Class::Archer),
        ("Vex", Class::Rogue),
    ];
    let mut names: HashMap<Uuid, &str> = HashMap::new();
    for (name, class) in roster {
        let id = Uuid::new_v4();
        names.insert(id, name);
        arena.register(id).await?;
        arena.choose_class(id, class).await?;
    }

    arena.start_when_ready().await?;

    loop {
        tokio::select! {
            notification = rx.recv() => {
                match notification {
                    Some(notification) => {
                        let done = matches!(notification, Notification::GameEnded { .. });
                        render(&names, &notification);
                        if done {
                            break;
                        }
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("Shutdown requested");
                arena.force_end("host shutdown").await;
            }
        }
    }

    Ok(())
}

/// Render one notification as a log line, mapping ids back to names
fn render(names: &HashMap<Uuid, &str>, notification: &Notification) {
    let name = |id: &Uuid| names.get(id).copied().unwrap_or("unknown");
    match notification {
        Notification::RoundStarted { round, living } => {
            info!("--- Round {round}: {living} survivors ---");
        }
        Notification::EventOccurred {
            player,
            description,
            ..
        } => info!("{} {}", name(player), description),
        Notification::CombatResolved(outcome) => {
            if outcome.dodged {
                info!(
                    "{} attacks {} but the strike is dodged",
                    name(&outcome.attacker),
                    name(&outcome.defender)
                );
            } else {
                info!(
                    "{} hits {} for {} damage{}",
                    name(&outcome.attacker),
                    name(&outcome.defender),
                    outcome.damage,
                    if outcome.critical { " (critical!)" } else { "" }
                );
            }
        }
        Notification::PlayerEliminated { player, by } => match by {
            Some(by) => info!("{} is eliminated by {}", name(player), name(by)),
            None => info!("{} is eliminated", name(player)),
        },
        Notification::AllianceFormed {
            members, synergy, ..
        } => info!(
            "{} and {} form an alliance ({:?})",
            name(&members[0]),
            name(&members[1]),
            synergy
        ),
        Notification::AllianceBroken { members, .. } => info!(
            "The alliance between {} and {} ends",
            name(&members[0]),
            name(&members[1])
        ),
        Notification::AllianceBetrayed {
            betrayer, victim, ..
        } => info!("{} betrays {}!", name(betrayer), name(victim)),
        Notification::ItemUsed {
            player,
            item,
            description,
        } => info!("{} uses {}: {}", name(player), item, description),
        Notification::SpecialUsed {
            player,
            description,
            ..
        } => info!("{} {}", name(player), description),
        Notification::GameEnded { winner, rounds } => match winner {
            Some(winner) => info!("{} wins after {} rounds!", name(winner), rounds),
            None => info!("No survivors after {} rounds", rounds),
        },
    }
}

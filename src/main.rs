mod config;
mod core;
mod models;
mod services;

use crate::config::Settings;
use crate::core::{ActionOutcome, Confirmation, MatchAction, MatchController, MatchView};
use crate::models::ProfileStatus;
use crate::services::BackendClient;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&log_level))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting G-Match flow driver...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded (API: {})", settings.api.base_url);

    let backend = Arc::new(
        BackendClient::with_timeout(
            settings.api.base_url.clone(),
            settings.api.session_token.clone(),
            std::time::Duration::from_secs(settings.api.timeout_secs),
        )
        .unwrap_or_else(|e| {
            error!("Failed to build API client: {}", e);
            panic!("API client error: {}", e);
        }),
    );

    // Matching requires a completed profile; the wizard lives in the web
    // app, so all we can do here is point the user there.
    match backend.get_profile_status().await {
        Ok(res) if res.profile_status != ProfileStatus::Complete => {
            println!("Your profile is incomplete ({:?}).", res.profile_status);
            println!("Finish the property/survey wizard in the web app first.");
            return Ok(());
        }
        Ok(_) => {}
        Err(e) => warn!("Profile check failed, continuing anyway: {}", e),
    }

    let mut controller = MatchController::new(Arc::clone(&backend), settings.polling.interval());
    let mut status_rx = controller.subscribe();

    println!("Checking match status...");
    controller.activate().await;
    if let Err(e) = controller.load_view_data().await {
        warn!("Could not load view payload: {}", e);
    }
    render(&controller);
    // The activation fetch already flipped the watch flag; mark it seen so
    // the loop below does not immediately re-render the same state.
    status_rx.borrow_and_update();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending_confirmation: Option<MatchAction> = None;
    let mut last_rendered = controller.snapshot().match_status;

    loop {
        tokio::select! {
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                // A poll tick moved the status; pull the view payload for
                // the new state and re-render. Refreshes triggered by the
                // command branch below land here too, so skip anything the
                // user has already seen.
                let current = *status_rx.borrow_and_update();
                if current == last_rendered {
                    continue;
                }
                if let Err(e) = controller.load_view_data().await {
                    warn!("Could not load view payload: {}", e);
                }
                render(&controller);
                last_rendered = current;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let input = line.trim().to_lowercase();
                if input.is_empty() {
                    continue;
                }
                if input == "quit" || input == "exit" {
                    break;
                }
                if input == "refresh" {
                    controller.refresh().await;
                    if let Err(e) = controller.load_view_data().await {
                        warn!("Could not load view payload: {}", e);
                    }
                    render(&controller);
                    last_rendered = controller.snapshot().match_status;
                    continue;
                }

                if let Some(action) = pending_confirmation.take() {
                    if input == "yes" {
                        run_action(&mut controller, action, Confirmation::Confirmed, &mut pending_confirmation).await;
                    } else {
                        println!("Cancelled: {}.", action.label());
                        render(&controller);
                    }
                    last_rendered = controller.snapshot().match_status;
                    continue;
                }

                match parse_command(controller.current_view(), &input) {
                    Some(action) => {
                        run_action(&mut controller, action, Confirmation::None, &mut pending_confirmation).await;
                        last_rendered = controller.snapshot().match_status;
                    }
                    None => println!("Unknown command: {:?}. {}", input, command_hint(controller.current_view())),
                }
            }
        }
    }

    info!("Leaving match flow");
    Ok(())
}

async fn run_action(
    controller: &mut MatchController,
    action: MatchAction,
    confirmation: Confirmation,
    pending: &mut Option<MatchAction>,
) {
    match controller.perform(action, confirmation).await {
        ActionOutcome::Refreshed => {
            println!("Done: {}.", action.label());
            if let Err(e) = controller.load_view_data().await {
                warn!("Could not load view payload: {}", e);
            }
            render(controller);
        }
        ActionOutcome::ConfirmationRequired => {
            println!(
                "About to {} - this cannot be undone. Type 'yes' to confirm.",
                action.label()
            );
            *pending = Some(action);
        }
        ActionOutcome::Busy => println!("Still working on the previous request..."),
        ActionOutcome::Failed(notice) => println!("{}: {}", notice.title, notice.body),
    }
}

fn parse_command(view: MatchView, input: &str) -> Option<MatchAction> {
    let action = match input {
        "start" => MatchAction::Start,
        "cancel" => match view {
            MatchView::Approval => MatchAction::CancelApproval,
            _ => MatchAction::CancelQueue,
        },
        "approve" | "accept" => MatchAction::Approve,
        "reject" => MatchAction::Reject,
        "rematch" => MatchAction::Rematch,
        _ => return None,
    };
    MatchAction::available_for(view)
        .contains(&action)
        .then_some(action)
}

fn command_hint(view: MatchView) -> String {
    let actions: Vec<&str> = MatchAction::available_for(view)
        .iter()
        .map(|a| match a {
            MatchAction::Start => "start",
            MatchAction::CancelQueue | MatchAction::CancelApproval => "cancel",
            MatchAction::Approve => "approve",
            MatchAction::Reject => "reject",
            MatchAction::Rematch => "rematch",
        })
        .collect();
    if actions.is_empty() {
        "Available: refresh, quit".to_string()
    } else {
        format!("Available: {}, refresh, quit", actions.join(", "))
    }
}

fn render(controller: &MatchController) {
    let snapshot = controller.snapshot();
    println!();
    println!("-- match status as of {} --", chrono::Local::now().format("%H:%M:%S"));
    match controller.current_view() {
        MatchView::Loading => println!("Checking match status..."),
        MatchView::Home => println!("Ready to match. Type 'start' to enter the queue."),
        MatchView::Waiting => {
            println!("In the matching queue; checking for a partner periodically.");
            println!("Type 'cancel' to leave the queue.");
        }
        MatchView::Result | MatchView::Approval | MatchView::ResultFailed => {
            match controller.current_view() {
                MatchView::Result => println!("A candidate was found!"),
                MatchView::Approval => println!("You approved; waiting for your partner's answer."),
                _ => println!("Your partner declined this match."),
            }
            if let Some(property) = &snapshot.partner_property {
                println!(
                    "  {} (class of '{}, building {}, {} semester(s))",
                    property.nickname, property.student_id, property.dorm_building, property.stay_period
                );
            }
            if let Some(score) = snapshot.compatibility_score.as_ref().and_then(|s| s.overall()) {
                println!("  Compatibility: {:.1}", score);
            }
            if let Some(survey) = &snapshot.partner_survey {
                if !survey.badges.is_empty() {
                    println!("  Badges: {}", survey.badges.join(", "));
                }
            }
        }
        MatchView::Contact => {
            println!("Match confirmed! Your roommate's contact:");
            match &snapshot.partner_contact {
                Some(contact) => {
                    println!("  {} ({}) - {}", contact.name, contact.gender, contact.phone)
                }
                None => println!("  (contact not available yet, try 'refresh')"),
            }
        }
        MatchView::ContactFailed => {
            println!("Your partner requested a rematch; this match is no longer active.");
            if let Some(contact) = &snapshot.partner_contact {
                println!("  Previous contact: {} - {}", contact.name, contact.phone);
            }
        }
    }
    println!("{}", command_hint(controller.current_view()));
}

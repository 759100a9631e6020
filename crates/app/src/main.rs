use crowdfund_app::{AppConfig, Ledger, script};
use crowdfund_events::{Event, EventBus};
use crowdfund_observability::LogFormat;

fn main() -> anyhow::Result<()> {
    let format = std::env::var("CROWDFUND_LOG_FORMAT")
        .ok()
        .and_then(|raw| raw.parse::<LogFormat>().ok())
        .unwrap_or_default();
    crowdfund_observability::init_with(format);

    let config = AppConfig::load()?;
    let ledger = Ledger::build(&config);
    let notifications = ledger.bus.subscribe();

    let steps = match std::env::args().nth(1) {
        Some(path) => script::load(path)?,
        None => {
            tracing::info!("no script given; running the built-in session");
            script::demo()
        }
    };

    for outcome in script::run(&ledger, &steps) {
        match &outcome.result {
            Ok(effect) => tracing::info!(step = outcome.index, ?effect, "step ok"),
            Err(e) => tracing::warn!(step = outcome.index, step_op = ?outcome.step, "step failed: {e}"),
        }
    }

    for envelope in notifications.drain() {
        let payload = serde_json::to_string(envelope.payload())?;
        tracing::info!(
            sequence = envelope.sequence_number(),
            campaign_id = %envelope.campaign_id(),
            event_type = envelope.payload().event_type(),
            payload = %payload,
            "notification"
        );
    }

    let campaigns = ledger.engine.get_all_campaigns()?;
    println!("{}", serde_json::to_string_pretty(&campaigns)?);

    Ok(())
}

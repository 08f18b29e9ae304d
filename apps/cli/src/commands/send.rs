//! Default command: send a single notification

use anyhow::{bail, Context, Result};
use pushover_core::{
    Notification, NotificationClient, NotificationRequest, Priority, PushoverClient,
    PushoverSettings,
};

use crate::SendArgs;

/// Positional `MESSAGE [TITLE]` is only read when `--message` is absent
fn build_request(args: SendArgs) -> Result<NotificationRequest> {
    let (message, title) = match args.message.filter(|m| !m.is_empty()) {
        Some(message) => (Some(message), args.title),
        None => {
            let mut positional = args.positional.into_iter();
            let message = positional.next();
            (message, args.title.or_else(|| positional.next()))
        }
    };
    let Some(message) = message.filter(|m| !m.is_empty()) else {
        bail!("message is required");
    };

    let mut request = NotificationRequest::new(message);
    request.title = title;
    request.sound = args.sound;
    request.device = args.device;
    request.expire_secs = args.expire;
    if let Some(priority) = args.priority {
        request.priority = Some(Priority::try_from(priority)?);
    }
    Ok(request)
}

pub async fn run(args: SendArgs) -> Result<()> {
    let request = build_request(args).context("argument parsing failed")?;

    let settings = PushoverSettings::from_env().context("failed to load configuration")?;
    let client =
        PushoverClient::new(&settings).context("failed to create Pushover client")?;

    let notification = Notification::from_request(request, &settings)?;
    client
        .send(&notification)
        .await
        .context("failed to send message")?;

    println!("Notification sent successfully");
    Ok(())
}

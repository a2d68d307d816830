use crate::events::LibraryEvent;

/// Trait for library event observation
pub trait LibraryObserver {
    /// Called after the engine has applied a change
    fn on_event(&self, event: &LibraryEvent);
}

/// Logs every event that occurs in the system
#[derive(Debug)]
pub struct EventLogger;

impl LibraryObserver for EventLogger {
    fn on_event(&self, event: &LibraryEvent) {
        log::info!("event: {event:?}");
    }
}

/// Raises notices for events a librarian should act on
#[derive(Debug)]
pub struct NotificationService;

impl LibraryObserver for NotificationService {
    fn on_event(&self, event: &LibraryEvent) {
        match event {
            LibraryEvent::Returned {
                checkout_id,
                overdue_days,
                fee,
                ..
            } if *overdue_days > 0 => {
                log::warn!(
                    "NOTIFICATION: {checkout_id} returned {overdue_days} day(s) late, fee {fee:.2}"
                );
            }
            LibraryEvent::MarkedOverdue { checkout_id } => {
                log::warn!("NOTIFICATION: {checkout_id} is overdue");
            }
            LibraryEvent::MemberStatusChanged { member_id, status } => {
                log::info!("NOTIFICATION: member {member_id} is now {status}");
            }
            _ => {}
        }
    }
}

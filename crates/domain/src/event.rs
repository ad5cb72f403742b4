use std::error::Error;

use chrono::NaiveDate;
use derive_more::Display;
use log::error;

use crate::{UserID, WorkoutRecord};

/// Change notification sent by the workout store after a state change has been persisted.
#[derive(Debug, Clone, PartialEq, strum::IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
pub enum Event {
    WorkoutsLoaded { count: usize },
    WorkoutsSaved { count: usize },
    WorkoutAdded(WorkoutRecord),
    WorkoutUpdated(WorkoutRecord),
    WorkoutDeleted(NaiveDate),
    UserChanged(UserID),
    DataImported { imported: usize, total: usize },
    CloudSynced { total: usize },
}

impl Event {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

pub trait Observer {
    fn notify(&mut self, event: &Event) -> Result<(), Box<dyn Error>>;
}

impl<F> Observer for F
where
    F: FnMut(&Event) -> Result<(), Box<dyn Error>>,
{
    fn notify(&mut self, event: &Event) -> Result<(), Box<dyn Error>> {
        self(event)
    }
}

#[derive(Display, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionID(u64);

/// Registered observers in subscription order.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    observers: Vec<(SubscriptionID, Box<dyn Observer>)>,
}

impl Observers {
    pub fn subscribe(&mut self, observer: impl Observer + 'static) -> SubscriptionID {
        let id = SubscriptionID(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionID) -> bool {
        let len = self.observers.len();
        self.observers.retain(|(i, _)| *i != id);
        self.observers.len() != len
    }

    /// Deliver `event` to every observer. A failing observer is logged and skipped.
    pub fn dispatch(&mut self, event: &Event) {
        for (id, observer) in &mut self.observers {
            if let Err(err) = observer.notify(event) {
                error!("observer {id} failed to handle {}: {err}", event.name());
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("next_id", &self.next_id)
            .field("len", &self.observers.len())
            .finish()
    }
}

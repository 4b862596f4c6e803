//! Notifications produced by accepted election commands.

use ballot_types::{AccountId, ProposalId, WorkflowStatus};
use serde::{Deserialize, Serialize};

use crate::ElectionLedger;

/// Domain events emitted by the [`ElectionLedger`](crate::ElectionLedger).
///
/// Each accepted command produces one event. Phase transitions additionally
/// journal a phase-named event right after their `WorkflowStatusChange`.
/// Rejected commands produce none.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ElectionEvent {
    /// An identity was added to the whitelist.
    VoterRegistered { voter: AccountId },
    /// The workflow advanced one phase.
    WorkflowStatusChange {
        previous_status: WorkflowStatus,
        new_status: WorkflowStatus,
    },
    ProposalsRegistrationStarted,
    ProposalsRegistrationEnded,
    VotingSessionStarted,
    VotingSessionEnded,
    /// A proposal was appended at `proposal_id`.
    ProposalRegistered { proposal_id: ProposalId },
    /// A voter cast their vote.
    Voted {
        voter: AccountId,
        proposal_id: ProposalId,
    },
    /// The election closed with the given winner.
    VotesTallied { winning_proposal_id: ProposalId },
}

impl ElectionEvent {
    /// Notification name as exposed to observers.
    pub fn name(&self) -> &'static str {
        match self {
            Self::VoterRegistered { .. } => "VoterRegistered",
            Self::WorkflowStatusChange { .. } => "WorkflowStatusChange",
            Self::ProposalsRegistrationStarted => "ProposalsRegistrationStarted",
            Self::ProposalsRegistrationEnded => "ProposalsRegistrationEnded",
            Self::VotingSessionStarted => "VotingSessionStarted",
            Self::VotingSessionEnded => "VotingSessionEnded",
            Self::ProposalRegistered { .. } => "ProposalRegistered",
            Self::Voted { .. } => "Voted",
            Self::VotesTallied { .. } => "VotesTallied",
        }
    }

    /// Phase-named event announcing entry into `status`. Tallying has its own
    /// `VotesTallied` event and the initial phase is never entered, so both
    /// map to `None`.
    pub fn entered_phase(status: WorkflowStatus) -> Option<Self> {
        match status {
            WorkflowStatus::ProposalsRegistrationStarted => Some(Self::ProposalsRegistrationStarted),
            WorkflowStatus::ProposalsRegistrationEnded => Some(Self::ProposalsRegistrationEnded),
            WorkflowStatus::VotingSessionStarted => Some(Self::VotingSessionStarted),
            WorkflowStatus::VotingSessionEnded => Some(Self::VotingSessionEnded),
            WorkflowStatus::RegisteringVoters | WorkflowStatus::VotesTallied => None,
        }
    }

    /// Events the journal records for this accepted command result.
    pub(crate) fn journal_entries(&self) -> impl Iterator<Item = Self> {
        let follow_up = match self {
            Self::WorkflowStatusChange { new_status, .. } => Self::entered_phase(*new_status),
            _ => None,
        };
        std::iter::once(self.clone()).chain(follow_up)
    }
}

type Listener = Box<dyn Fn(&ElectionEvent) + Send + Sync>;

/// Hands journaled election events to observers.
///
/// The ledger never owns a bus: observers drain the ledger's journal into
/// one, and each listener is called inline, in subscription order.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl Fn(&ElectionEvent) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn publish(&self, event: &ElectionEvent) {
        self.listeners.iter().for_each(|listener| listener(event));
    }

    /// Publish every event in order.
    pub fn publish_all<'a>(&self, events: impl IntoIterator<Item = &'a ElectionEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Move the ledger's pending events to the listeners. Returns how many
    /// were published.
    pub fn drain_from(&self, ledger: &mut ElectionLedger) -> usize {
        let events = ledger.drain_events();
        self.publish_all(&events);
        events.len()
    }
}

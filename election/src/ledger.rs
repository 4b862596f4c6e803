//! The election ledger: whitelist, proposals, ballots and the workflow gate.
//!
//! Every command is checked in a fixed order before anything is mutated:
//! caller authorization, then workflow phase, then command-specific checks.
//! A rejected command leaves the ledger untouched.

use std::collections::HashMap;

use ballot_types::{AccountId, ProposalId, WorkflowStatus};

use crate::error::{ElectionError, Role};
use crate::event::ElectionEvent;
use crate::policy::WhitelistPolicy;
use crate::proposal::Proposal;
use crate::voter::Voter;

/// Most proposals one election holds; ids and counts both fit a `ProposalId`.
pub const MAX_PROPOSALS: u32 = u32::MAX;

/// A single election owned by one administrator.
#[derive(Clone, Debug)]
pub struct ElectionLedger {
    administrator: AccountId,
    policy: WhitelistPolicy,
    status: WorkflowStatus,
    voters: HashMap<AccountId, Voter>,
    /// Whitelisting order, for enumeration.
    whitelist: Vec<AccountId>,
    proposals: Vec<Proposal>,
    winning_proposal_id: ProposalId,
    /// Events of accepted commands not yet drained by an observer.
    events: Vec<ElectionEvent>,
}

impl ElectionLedger {
    /// Open a new election in `RegisteringVoters` with every collection empty.
    pub fn new(administrator: AccountId) -> Self {
        Self::with_policy(administrator, WhitelistPolicy::default())
    }

    pub fn with_policy(administrator: AccountId, policy: WhitelistPolicy) -> Self {
        Self {
            administrator,
            policy,
            status: WorkflowStatus::RegisteringVoters,
            voters: HashMap::new(),
            whitelist: Vec::new(),
            proposals: Vec::new(),
            winning_proposal_id: 0,
            events: Vec::new(),
        }
    }

    /// Rebuild a ledger from already validated parts.
    pub(crate) fn from_parts(
        administrator: AccountId,
        policy: WhitelistPolicy,
        status: WorkflowStatus,
        voters: Vec<(AccountId, Voter)>,
        proposals: Vec<Proposal>,
        winning_proposal_id: ProposalId,
    ) -> Self {
        let whitelist = voters.iter().map(|(account, _)| account.clone()).collect();
        Self {
            administrator,
            policy,
            status,
            voters: voters.into_iter().collect(),
            whitelist,
            proposals,
            winning_proposal_id,
            events: Vec::new(),
        }
    }

    // ── Commands ────────────────────────────────────────────────────────

    /// Whitelist `account` so it may submit proposals and vote.
    pub fn add_to_whitelist(
        &mut self,
        caller: &AccountId,
        account: AccountId,
    ) -> Result<ElectionEvent, ElectionError> {
        let result = self.apply_whitelist(caller, account);
        self.record("add_to_whitelist", caller, result)
    }

    pub fn start_proposals_registration(
        &mut self,
        caller: &AccountId,
    ) -> Result<ElectionEvent, ElectionError> {
        let result = self.apply_transition(caller, WorkflowStatus::RegisteringVoters);
        self.record("start_proposals_registration", caller, result)
    }

    pub fn end_proposals_registration(
        &mut self,
        caller: &AccountId,
    ) -> Result<ElectionEvent, ElectionError> {
        let result = self.apply_transition(caller, WorkflowStatus::ProposalsRegistrationStarted);
        self.record("end_proposals_registration", caller, result)
    }

    pub fn start_voting_session(
        &mut self,
        caller: &AccountId,
    ) -> Result<ElectionEvent, ElectionError> {
        let result = self.apply_transition(caller, WorkflowStatus::ProposalsRegistrationEnded);
        self.record("start_voting_session", caller, result)
    }

    pub fn end_voting_session(
        &mut self,
        caller: &AccountId,
    ) -> Result<ElectionEvent, ElectionError> {
        let result = self.apply_transition(caller, WorkflowStatus::VotingSessionStarted);
        self.record("end_voting_session", caller, result)
    }

    /// Submit a proposal; it receives the next free index.
    pub fn register_proposal(
        &mut self,
        caller: &AccountId,
        description: impl Into<String>,
    ) -> Result<ElectionEvent, ElectionError> {
        let result = self.apply_proposal(caller, description.into());
        self.record("register_proposal", caller, result)
    }

    /// Cast the caller's single vote for `proposal_id`.
    pub fn register_vote(
        &mut self,
        caller: &AccountId,
        proposal_id: ProposalId,
    ) -> Result<ElectionEvent, ElectionError> {
        let result = self.apply_vote(caller, proposal_id);
        self.record("register_vote", caller, result)
    }

    /// Close the election. The winner is already tracked, this confirms it.
    pub fn tally_votes(&mut self, caller: &AccountId) -> Result<ElectionEvent, ElectionError> {
        let result = self.apply_tally(caller);
        self.record("tally_votes", caller, result)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn administrator(&self) -> &AccountId {
        &self.administrator
    }

    pub fn policy(&self) -> WhitelistPolicy {
        self.policy
    }

    pub fn status(&self) -> WorkflowStatus {
        self.status
    }

    /// Whitelisted identities in the order they were added.
    pub fn whitelist(&self) -> &[AccountId] {
        &self.whitelist
    }

    /// Ballot record of a whitelisted identity.
    pub fn voter(&self, account: &AccountId) -> Option<&Voter> {
        self.voters.get(account)
    }

    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    pub fn proposal(&self, proposal_id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(proposal_id as usize)
    }

    pub fn proposal_count(&self) -> u32 {
        // Bounded by MAX_PROPOSALS on registration.
        u32::try_from(self.proposals.len()).unwrap_or(MAX_PROPOSALS)
    }

    /// Index of the leading proposal; 0 while no proposal exists.
    pub fn winning_proposal_id(&self) -> ProposalId {
        self.winning_proposal_id
    }

    pub fn winning_proposal(&self) -> Option<&Proposal> {
        self.proposal(self.winning_proposal_id)
    }

    /// Number of voters who have cast their vote.
    pub fn voted_count(&self) -> u32 {
        let voted = self.voters.values().filter(|v| v.has_voted).count();
        u32::try_from(voted).unwrap_or(u32::MAX)
    }

    /// Total votes recorded on proposals equals the number of voters who voted.
    pub fn votes_conserved(&self) -> bool {
        let recorded: u64 = self.proposals.iter().map(|p| u64::from(p.vote_count)).sum();
        recorded == u64::from(self.voted_count())
    }

    /// Events of accepted commands, oldest first.
    pub fn events(&self) -> &[ElectionEvent] {
        &self.events
    }

    /// Take the pending events, leaving the journal empty.
    pub fn drain_events(&mut self) -> Vec<ElectionEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Command bodies ──────────────────────────────────────────────────

    fn apply_whitelist(
        &mut self,
        caller: &AccountId,
        account: AccountId,
    ) -> Result<ElectionEvent, ElectionError> {
        self.ensure_administrator(caller)?;
        if !self.policy.allows(self.status) {
            return Err(ElectionError::WorkflowViolation {
                expected: WorkflowStatus::RegisteringVoters,
                actual: self.status,
            });
        }
        if self.voters.get(&account).is_some_and(|v| v.is_registered) {
            return Err(ElectionError::AlreadyWhitelisted(account));
        }

        self.voters.insert(account.clone(), Voter::registered());
        self.whitelist.push(account.clone());
        Ok(ElectionEvent::VoterRegistered { voter: account })
    }

    /// Advance one phase, from exactly `from`.
    fn apply_transition(
        &mut self,
        caller: &AccountId,
        from: WorkflowStatus,
    ) -> Result<ElectionEvent, ElectionError> {
        self.ensure_administrator(caller)?;
        self.ensure_status(from)?;
        let Some(next) = from.next() else {
            return Err(ElectionError::WorkflowViolation {
                expected: from,
                actual: self.status,
            });
        };

        self.status = next;
        tracing::info!(from = %from, to = %next, "workflow advanced");
        Ok(ElectionEvent::WorkflowStatusChange {
            previous_status: from,
            new_status: next,
        })
    }

    fn apply_proposal(
        &mut self,
        caller: &AccountId,
        description: String,
    ) -> Result<ElectionEvent, ElectionError> {
        self.ensure_registered(caller)?;
        self.ensure_status(WorkflowStatus::ProposalsRegistrationStarted)?;

        let proposal_id = next_proposal_id(self.proposals.len())?;
        self.proposals.push(Proposal::new(description));
        Ok(ElectionEvent::ProposalRegistered { proposal_id })
    }

    fn apply_vote(
        &mut self,
        caller: &AccountId,
        proposal_id: ProposalId,
    ) -> Result<ElectionEvent, ElectionError> {
        let voter = self.ensure_registered(caller)?;
        let already_voted = voter.has_voted;
        self.ensure_status(WorkflowStatus::VotingSessionStarted)?;
        if already_voted {
            return Err(ElectionError::AlreadyVoted(caller.clone()));
        }
        let proposal_count = self.proposal_count();
        let Some(proposal) = self.proposals.get_mut(proposal_id as usize) else {
            return Err(ElectionError::InvalidProposal {
                proposal_id,
                proposal_count,
            });
        };

        proposal.vote_count += 1;
        let new_count = proposal.vote_count;
        if let Some(voter) = self.voters.get_mut(caller) {
            voter.has_voted = true;
            voter.voted_proposal_id = proposal_id;
        }

        // Strictly greater only: a tie leaves the earlier leader in place.
        let leader_count = self
            .proposal(self.winning_proposal_id)
            .map_or(0, |p| p.vote_count);
        if new_count > leader_count {
            self.winning_proposal_id = proposal_id;
        }

        Ok(ElectionEvent::Voted {
            voter: caller.clone(),
            proposal_id,
        })
    }

    fn apply_tally(&mut self, caller: &AccountId) -> Result<ElectionEvent, ElectionError> {
        self.ensure_administrator(caller)?;
        self.ensure_status(WorkflowStatus::VotingSessionEnded)?;

        self.status = WorkflowStatus::VotesTallied;
        tracing::info!(
            winning_proposal_id = self.winning_proposal_id,
            proposals = self.proposals.len(),
            voted = self.voted_count(),
            "votes tallied"
        );
        Ok(ElectionEvent::VotesTallied {
            winning_proposal_id: self.winning_proposal_id,
        })
    }

    // ── Guards ──────────────────────────────────────────────────────────

    fn ensure_administrator(&self, caller: &AccountId) -> Result<(), ElectionError> {
        if caller == &self.administrator {
            Ok(())
        } else {
            Err(ElectionError::NotAuthorized {
                caller: caller.clone(),
                role: Role::Administrator,
            })
        }
    }

    fn ensure_registered(&self, caller: &AccountId) -> Result<&Voter, ElectionError> {
        self.voters
            .get(caller)
            .filter(|v| v.is_registered)
            .ok_or_else(|| ElectionError::NotAuthorized {
                caller: caller.clone(),
                role: Role::WhitelistedVoter,
            })
    }

    fn ensure_status(&self, expected: WorkflowStatus) -> Result<(), ElectionError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(ElectionError::WorkflowViolation {
                expected,
                actual: self.status,
            })
        }
    }

    /// Journal accepted events and log the outcome. A phase transition's
    /// phase-named event is journaled right after its status change.
    fn record(
        &mut self,
        command: &'static str,
        caller: &AccountId,
        result: Result<ElectionEvent, ElectionError>,
    ) -> Result<ElectionEvent, ElectionError> {
        match &result {
            Ok(event) => {
                tracing::debug!(
                    command = command,
                    caller = %caller,
                    event = event.name(),
                    "command accepted"
                );
                self.events.extend(event.journal_entries());
            }
            Err(error) => {
                tracing::debug!(
                    command = command,
                    caller = %caller,
                    error = %error,
                    "command rejected"
                );
            }
        }
        result
    }
}

/// Id for a proposal appended after `registered` existing ones.
fn next_proposal_id(registered: usize) -> Result<ProposalId, ElectionError> {
    match ProposalId::try_from(registered) {
        Ok(id) if id < MAX_PROPOSALS => Ok(id),
        _ => Err(ElectionError::ProposalLimit {
            limit: MAX_PROPOSALS,
        }),
    }
}

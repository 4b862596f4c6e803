//! Election snapshots, the persisted state layout of a ledger.
//!
//! A snapshot captures the administrator, policy, phase, whitelist (with each
//! voter's ballot record), proposals, and the current winner. The snapshot
//! hash is computed deterministically from that state so a restored ledger
//! can be checked for tampering. The event journal is not persisted.

use serde::{Deserialize, Serialize};

use ballot_types::{AccountId, ProposalId, WorkflowStatus};

use crate::error::ElectionError;
use crate::ledger::ElectionLedger;
use crate::policy::WhitelistPolicy;
use crate::proposal::Proposal;
use crate::voter::Voter;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A whitelisted identity and its ballot record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterEntry {
    pub account: AccountId,
    pub voter: Voter,
}

/// Full state of one election at a point in time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElectionSnapshot {
    /// Snapshot format version for compatibility.
    pub version: u32,
    /// Blake2b-256 of the fields below.
    pub hash: [u8; 32],
    pub administrator: AccountId,
    pub policy: WhitelistPolicy,
    pub status: WorkflowStatus,
    /// Voters in whitelisting order.
    pub voters: Vec<VoterEntry>,
    pub proposals: Vec<Proposal>,
    pub winning_proposal_id: ProposalId,
}

impl ElectionSnapshot {
    /// Compute the Blake2b-256 hash of this snapshot deterministically.
    fn compute_hash(&self) -> [u8; 32] {
        use blake2::digest::consts::U32;
        use blake2::{Blake2b, Digest};

        fn update_str(hasher: &mut Blake2b<U32>, s: &str) {
            hasher.update((s.len() as u64).to_le_bytes());
            hasher.update(s.as_bytes());
        }

        let mut hasher = Blake2b::<U32>::new();
        hasher.update(self.version.to_le_bytes());
        update_str(&mut hasher, self.administrator.as_str());
        hasher.update([match self.policy {
            WhitelistPolicy::AnyPhase => 0u8,
            WhitelistPolicy::RegistrationOnly => 1u8,
        }]);
        hasher.update([self.status.as_u8()]);

        hasher.update((self.voters.len() as u64).to_le_bytes());
        for entry in &self.voters {
            update_str(&mut hasher, entry.account.as_str());
            hasher.update([
                u8::from(entry.voter.is_registered),
                u8::from(entry.voter.has_voted),
            ]);
            hasher.update(entry.voter.voted_proposal_id.to_le_bytes());
        }

        hasher.update((self.proposals.len() as u64).to_le_bytes());
        for proposal in &self.proposals {
            update_str(&mut hasher, &proposal.description);
            hasher.update(proposal.vote_count.to_le_bytes());
        }
        hasher.update(self.winning_proposal_id.to_le_bytes());

        let result = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        out
    }

    /// Seal the snapshot by filling in its hash.
    fn sealed(mut self) -> Self {
        self.hash = self.compute_hash();
        self
    }

    /// Verify the snapshot hash matches the election data.
    pub fn verify(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Serialize the snapshot to bytes (bincode).
    pub fn to_bytes(&self) -> Result<Vec<u8>, ElectionError> {
        bincode::serialize(self).map_err(|e| ElectionError::Serialization(e.to_string()))
    }

    /// Deserialize a snapshot from bytes. The hash is not checked here.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ElectionError> {
        bincode::deserialize(bytes).map_err(|e| ElectionError::CorruptSnapshot(e.to_string()))
    }

    /// Check every ledger invariant the snapshot must satisfy.
    fn validate(&self) -> Result<(), ElectionError> {
        let corrupt = |msg: String| Err(ElectionError::CorruptSnapshot(msg));

        if self.version != SNAPSHOT_VERSION {
            return corrupt(format!("unsupported snapshot version {}", self.version));
        }
        if !self.verify() {
            return corrupt("hash mismatch".into());
        }
        if !self.proposals.is_empty() && self.status < WorkflowStatus::ProposalsRegistrationStarted
        {
            return corrupt(format!("proposals present in status {}", self.status));
        }

        let mut seen = std::collections::HashSet::new();
        let mut tallies = vec![0u64; self.proposals.len()];
        for entry in &self.voters {
            if !seen.insert(&entry.account) {
                return corrupt(format!("voter {} listed twice", entry.account));
            }
            if !entry.voter.is_registered {
                return corrupt(format!("voter {} is not registered", entry.account));
            }
            let Some(choice) = entry.voter.vote() else {
                if entry.voter.voted_proposal_id != 0 {
                    return corrupt(format!(
                        "voter {} has not voted but records proposal {}",
                        entry.account, entry.voter.voted_proposal_id
                    ));
                }
                continue;
            };
            if self.status < WorkflowStatus::VotingSessionStarted {
                return corrupt(format!("vote recorded in status {}", self.status));
            }
            match tallies.get_mut(choice as usize) {
                Some(count) => *count += 1,
                None => {
                    return corrupt(format!(
                        "voter {} voted for missing proposal {choice}",
                        entry.account
                    ))
                }
            }
        }

        for (id, (proposal, counted)) in self.proposals.iter().zip(&tallies).enumerate() {
            if u64::from(proposal.vote_count) != *counted {
                return corrupt(format!(
                    "proposal {id} records {} votes but {counted} voters chose it",
                    proposal.vote_count
                ));
            }
        }

        // The winner only moves when a vote lands, so without votes it is 0.
        if tallies.iter().all(|&count| count == 0) && self.winning_proposal_id != 0 {
            return corrupt(format!(
                "winning proposal {} set without any votes",
                self.winning_proposal_id
            ));
        }
        match self.proposals.get(self.winning_proposal_id as usize) {
            Some(winner) => {
                if self.proposals.iter().any(|p| p.vote_count > winner.vote_count) {
                    return corrupt("winning proposal is not the leader".into());
                }
            }
            None if self.proposals.is_empty() && self.winning_proposal_id == 0 => {}
            None => {
                return corrupt(format!(
                    "winning proposal {} out of range",
                    self.winning_proposal_id
                ))
            }
        }
        Ok(())
    }
}

impl ElectionLedger {
    /// Capture the current state as a sealed snapshot.
    pub fn snapshot(&self) -> ElectionSnapshot {
        let voters = self
            .whitelist()
            .iter()
            .map(|account| VoterEntry {
                account: account.clone(),
                voter: self.voter(account).cloned().unwrap_or_default(),
            })
            .collect();
        ElectionSnapshot {
            version: SNAPSHOT_VERSION,
            hash: [0u8; 32],
            administrator: self.administrator().clone(),
            policy: self.policy(),
            status: self.status(),
            voters,
            proposals: self.proposals().to_vec(),
            winning_proposal_id: self.winning_proposal_id(),
        }
        .sealed()
    }

    /// Rebuild a ledger from a snapshot after checking its hash and invariants.
    pub fn restore(snapshot: ElectionSnapshot) -> Result<Self, ElectionError> {
        snapshot.validate()?;
        tracing::debug!(
            status = %snapshot.status,
            voters = snapshot.voters.len(),
            proposals = snapshot.proposals.len(),
            "restoring election from snapshot"
        );
        Ok(Self::from_parts(
            snapshot.administrator,
            snapshot.policy,
            snapshot.status,
            snapshot
                .voters
                .into_iter()
                .map(|entry| (entry.account, entry.voter))
                .collect(),
            snapshot.proposals,
            snapshot.winning_proposal_id,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::event::ElectionEvent;

    fn admin() -> AccountId {
        AccountId::new("admin")
    }

    fn account(name: &str) -> AccountId {
        AccountId::new(name)
    }

    fn finished_election() -> ElectionLedger {
        let mut ledger = ElectionLedger::new(admin());
        for name in ["alice", "bob", "carol"] {
            ledger.add_to_whitelist(&admin(), account(name)).unwrap();
        }
        ledger.start_proposals_registration(&admin()).unwrap();
        ledger.register_proposal(&account("alice"), "more coffee breaks").unwrap();
        ledger.register_proposal(&account("bob"), "longer nap times").unwrap();
        ledger.end_proposals_registration(&admin()).unwrap();
        ledger.start_voting_session(&admin()).unwrap();
        ledger.register_vote(&account("alice"), 1).unwrap();
        ledger.register_vote(&account("bob"), 1).unwrap();
        ledger.end_voting_session(&admin()).unwrap();
        ledger
    }

    #[test]
    fn snapshot_is_sealed_and_ordered() {
        let snap = finished_election().snapshot();
        assert!(snap.verify());
        assert_eq!(snap.version, SNAPSHOT_VERSION);
        let names: Vec<_> = snap.voters.iter().map(|e| e.account.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
        assert_eq!(snap.winning_proposal_id, 1);
    }

    #[test]
    fn restore_resumes_the_election() {
        let original = finished_election();
        let bytes = original.snapshot().to_bytes().unwrap();
        let mut restored =
            ElectionLedger::restore(ElectionSnapshot::from_bytes(&bytes).unwrap()).unwrap();

        assert_eq!(restored.status(), WorkflowStatus::VotingSessionEnded);
        assert_eq!(restored.whitelist(), original.whitelist());
        assert_eq!(restored.proposals(), original.proposals());
        assert_eq!(restored.voter(&account("bob")).unwrap().vote(), Some(1));
        assert!(restored.events().is_empty());

        restored.tally_votes(&admin()).unwrap();
        assert_eq!(restored.status(), WorkflowStatus::VotesTallied);
    }

    #[test]
    fn tampered_snapshot_is_rejected() {
        let mut snap = finished_election().snapshot();
        snap.proposals[0].vote_count = 5;
        let err = ElectionLedger::restore(snap).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptSnapshot);
    }

    #[test]
    fn resealed_inconsistent_snapshot_is_rejected() {
        let mut snap = finished_election().snapshot();
        snap.proposals[0].vote_count = 1;
        let snap = snap.sealed();
        assert!(snap.verify());
        let err = ElectionLedger::restore(snap).unwrap_err();
        assert!(matches!(err, ElectionError::CorruptSnapshot(msg) if msg.contains("proposal 0")));
    }

    #[test]
    fn resealed_wrong_winner_is_rejected() {
        let mut snap = finished_election().snapshot();
        snap.winning_proposal_id = 0;
        let err = ElectionLedger::restore(snap.sealed()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptSnapshot);
    }

    #[test]
    fn resealed_winner_without_votes_is_rejected() {
        let mut ledger = ElectionLedger::new(admin());
        ledger.add_to_whitelist(&admin(), account("alice")).unwrap();
        ledger.start_proposals_registration(&admin()).unwrap();
        for description in ["p0", "p1", "p2"] {
            ledger.register_proposal(&account("alice"), description).unwrap();
        }
        ledger.end_proposals_registration(&admin()).unwrap();
        ledger.start_voting_session(&admin()).unwrap();
        ledger.end_voting_session(&admin()).unwrap();

        let mut snap = ledger.snapshot();
        snap.winning_proposal_id = 2;
        let err = ElectionLedger::restore(snap.sealed()).unwrap_err();
        assert!(matches!(err, ElectionError::CorruptSnapshot(msg) if msg.contains("without any votes")));

        // Untouched, the same election restores and tallies to proposal 0.
        let mut restored = ElectionLedger::restore(ledger.snapshot()).unwrap();
        assert_eq!(
            restored.tally_votes(&admin()).unwrap(),
            ElectionEvent::VotesTallied {
                winning_proposal_id: 0
            }
        );
    }

    #[test]
    fn resealed_winner_with_zero_votes_among_voted_is_rejected() {
        let mut snap = finished_election().snapshot();
        snap.proposals.push(Proposal::new("late addition"));
        snap.winning_proposal_id = 2;
        let err = ElectionLedger::restore(snap.sealed()).unwrap_err();
        assert!(matches!(err, ElectionError::CorruptSnapshot(msg) if msg.contains("not the leader")));
    }

    #[test]
    fn stray_choice_on_non_voter_is_rejected() {
        let mut snap = finished_election().snapshot();
        let carol = &mut snap.voters[2].voter;
        assert!(!carol.has_voted);
        carol.voted_proposal_id = 1;
        let err = ElectionLedger::restore(snap.sealed()).unwrap_err();
        assert!(matches!(err, ElectionError::CorruptSnapshot(msg) if msg.contains("has not voted")));
    }

    #[test]
    fn duplicate_voter_is_rejected() {
        let mut snap = finished_election().snapshot();
        let dup = snap.voters[2].clone();
        snap.voters.push(dup);
        let err = ElectionLedger::restore(snap.sealed()).unwrap_err();
        assert!(matches!(err, ElectionError::CorruptSnapshot(msg) if msg.contains("twice")));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let err = ElectionSnapshot::from_bytes(&[0xFF; 7]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptSnapshot);
    }

    #[test]
    fn empty_election_roundtrips() {
        let ledger = ElectionLedger::with_policy(admin(), WhitelistPolicy::RegistrationOnly);
        let restored = ElectionLedger::restore(ledger.snapshot()).unwrap();
        assert_eq!(restored.policy(), WhitelistPolicy::RegistrationOnly);
        assert_eq!(restored.status(), WorkflowStatus::RegisteringVoters);
        assert!(restored.winning_proposal().is_none());
    }
}

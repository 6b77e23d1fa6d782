use crate::models::{DashboardCategory, RejectRound};

const JOINED: [&str; 2] = ["joined", "internship letter shared"];
const SELECTED: [&str; 3] = ["selected", "yes", "shortlisted"];
const REJECTED: [&str; 4] = [
    "rejected",
    "rejected in r1",
    "rejected in r2",
    "offer declined...",
];
const SCREENING_REJECT: [&str; 2] = ["screening reject", "rejected in technical screening"];
const PENDING: [&str; 9] = [
    "in process",
    "under discussion",
    "pending at r1",
    "pending at r2",
    "pending at r3",
    "on hold",
    "scheduled for r1",
    "scheduled for r2",
    "scheduled for r3",
];

const NOT_CLEARED: &str = "Not Cleared";

/// Maps the free-text status and the three interview-round outcomes to a
/// single pipeline stage. Rules are checked in order; the first hit wins.
pub fn categorize_status(
    status: &str,
    r1: &str,
    r2: &str,
    r3: &str,
) -> (DashboardCategory, Option<RejectRound>) {
    let status = status.trim().to_lowercase();
    let (r1, r2, r3) = (r1.trim(), r2.trim(), r3.trim());

    if status.is_empty() || status == "nan" {
        return (DashboardCategory::PendingActive, None);
    }
    if JOINED.contains(&status.as_str()) {
        return (DashboardCategory::Joined, None);
    }
    if SELECTED.contains(&status.as_str()) {
        return (DashboardCategory::Selected, None);
    }
    if SCREENING_REJECT.contains(&status.as_str()) {
        return (DashboardCategory::ScreeningReject, None);
    }

    // Round outcomes are compared case-sensitively.
    let reject_round = if r1 == NOT_CLEARED {
        Some(RejectRound::R1)
    } else if r2 == NOT_CLEARED {
        Some(RejectRound::R2)
    } else if r3 == NOT_CLEARED {
        Some(RejectRound::R3)
    } else {
        None
    };

    if REJECTED.contains(&status.as_str()) || status.contains("rejected") {
        if reject_round.is_none() && r1.is_empty() && r2.is_empty() && r3.is_empty() {
            return (DashboardCategory::ScreeningReject, None);
        }
        return (DashboardCategory::Rejected, reject_round);
    }

    if PENDING.contains(&status.as_str()) {
        return (DashboardCategory::PendingActive, None);
    }

    (DashboardCategory::Other, None)
}

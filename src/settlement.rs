//! Settlement algorithms.
//!
//! Two algorithms live here and intentionally differ:
//!
//! - [`compute_transactions`] settles a single hand by walking adjacent
//!   pairs of players sorted by score. It is greedy and not minimal.
//! - [`settle_session`] settles a whole session by splitting every
//!   debtor's debt across creditors in proportion to their credit.
//!
//! Both are pure functions of their input.

use crate::error::{EngineError, Result};
use crate::hand::{Scores, Transaction};
use crate::session::Session;
use log::{debug, warn};
use serde::Serialize;

/// Session-level result: cumulative scores and the payments that clear them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub final_scores: Scores,
    pub final_transactions: Vec<Transaction>,
}

/// Adjacent-pair settlement of one hand's net scores.
///
/// Players with a zero score took no net part in the hand and are left out.
/// The rest are sorted by score, highest first (ties in name order). For each
/// consecutive pair `(hi, lo)` the amount `min(score(hi), -score(lo))` is paid
/// from `lo` to `hi` when positive. Scores are not carried between pairs.
pub fn compute_transactions(scores: &Scores) -> Vec<Transaction> {
    let mut ranked: Vec<(&str, i64)> = scores
        .iter()
        .filter(|(_, s)| **s != 0)
        .map(|(p, s)| (p.as_str(), *s))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .windows(2)
        .filter_map(|pair| {
            let (receiver, credit) = pair[0];
            let (payer, debt) = pair[1];
            let points = credit.min(debt.saturating_neg());
            if points > 0 {
                Some(transfer(payer, receiver, points))
            } else {
                None
            }
        })
        .collect()
}

/// Proportional settlement of a whole session.
///
/// Hand scores for players no longer in the session are ignored. Each
/// debtor's debt is split across all creditors by credit share, rounding each
/// share independently, so the shares may not add up to the exact debt.
///
/// Fails with `InvalidSession` if a cumulative score leaves the `i64` range.
pub fn settle_session(session: &Session) -> Result<Settlement> {
    let mut totals: Vec<(&str, i64)> = session.players().iter().map(|p| (p.as_str(), 0)).collect();

    for hand in session.hands() {
        for (player, score) in hand.scores() {
            match totals.iter_mut().find(|(name, _)| *name == player.as_str()) {
                Some((_, total)) => {
                    *total = total
                        .checked_add(*score)
                        .ok_or_else(|| overflow(session, player))?;
                }
                None => debug!("Ignoring score for {} who left the session", player),
            }
        }
    }

    let final_scores: Scores = totals.iter().map(|(p, s)| (p.to_string(), *s)).collect();

    let mut ranked: Vec<(&str, i64)> = totals.into_iter().filter(|(_, s)| *s != 0).collect();
    ranked.sort_by_key(|(_, s)| *s);

    let debtors: Vec<(&str, i64)> = ranked.iter().copied().filter(|(_, s)| *s < 0).collect();
    let creditors: Vec<(&str, i64)> = ranked.iter().copied().filter(|(_, s)| *s > 0).collect();

    let mut final_transactions = Vec::new();
    for (debtor, score) in debtors {
        let abs_debt = score.checked_neg().ok_or_else(|| overflow(session, debtor))?;
        let total_credits = creditors
            .iter()
            .try_fold(0i64, |sum, (_, c)| sum.checked_add(*c))
            .ok_or_else(|| EngineError::session("total credit exceeds the score range"))?;
        if total_credits == 0 {
            // Only reachable when departed players held the matching credit.
            warn!(
                "{} owes {} but no remaining player is owed anything",
                debtor, abs_debt
            );
            continue;
        }

        for &(creditor, credit) in &creditors {
            let points = proportional_share(abs_debt, credit, total_credits);
            if points > 0 {
                final_transactions.push(transfer(debtor, creditor, points));
            }
        }
    }

    Ok(Settlement {
        final_scores,
        final_transactions,
    })
}

fn overflow(session: &Session, player: &str) -> EngineError {
    EngineError::session(format!(
        "score of {} in session {} exceeds the score range",
        player,
        session.id()
    ))
}

/// `round(debt * credit / total_credits)`, halves rounded up.
///
/// All inputs are positive and `credit <= total_credits`, so the result never
/// exceeds `debt`.
fn proportional_share(debt: i64, credit: i64, total_credits: i64) -> i64 {
    let numerator = 2 * i128::from(debt) * i128::from(credit) + i128::from(total_credits);
    let share = numerator / (2 * i128::from(total_credits));
    share as i64
}

fn transfer(from: &str, to: &str, points: i64) -> Transaction {
    Transaction::settled(from, to, points.unsigned_abs())
}

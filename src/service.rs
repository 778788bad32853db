use std::collections::{BTreeMap, HashSet};

use thiserror::Error;
use tracing::{error, info};

use crate::config::Config;
use crate::helpers::email::{Envelope, MailTransport};
use crate::helpers::harvest::HarvestApi;
use crate::helpers::report::{self, Report};
use crate::models::harvest::{DailyHours, DateRange, DayEntry, User};

/// Fatal run-level failures. Per-user fetch problems are logged and skipped;
/// these are the conditions the run cannot continue past.
#[derive(Debug, Error)]
pub enum BlameError {
    #[error("unable to fetch any user details, or no users are configured")]
    NoUsersResolved,
}

/// The reporting job: fetches users and their timesheets from Harvest,
/// renders the shame report and hands it to the mail transport.
pub struct BlameService<A, M> {
    api: A,
    mailer: M,
    config: Config,
}

impl<A: HarvestApi, M: MailTransport> BlameService<A, M> {
    pub fn new(api: A, mailer: M, config: Config) -> Self {
        Self {
            api,
            mailer,
            config,
        }
    }

    /// Run the full job: fetch users, build timesheets, render, dispatch.
    ///
    /// A failed dispatch is logged and does not fail the run.
    pub async fn run(&self) -> Result<(), BlameError> {
        let users = self.fetch_users().await;
        if users.is_empty() {
            return Err(BlameError::NoUsersResolved);
        }

        let timesheets = self.fetch_timesheets(&users).await;
        let report = report::render(&users, &timesheets, &self.config.range);
        self.dispatch(report, &users).await;

        Ok(())
    }

    /// Resolve each configured user id against Harvest, in configured order.
    /// A failed lookup drops that user from the run.
    async fn fetch_users(&self) -> Vec<User> {
        info!("Fetching user details:");

        let mut users = Vec::new();
        for &id in &self.config.users {
            match self.api.get_user(id).await {
                Ok(user) => {
                    info!("[OK]: {id}");
                    users.push(user);
                }
                Err(e) => error!("[FAILED]: {id} ({e})"),
            }
        }
        users
    }

    /// Build one dense timesheet per user. A failed entries fetch leaves that
    /// user without a timesheet; the renderer skips their row.
    async fn fetch_timesheets(&self, users: &[User]) -> BTreeMap<u64, DailyHours> {
        info!("Fetching timesheets:");

        let mut timesheets = BTreeMap::new();
        for user in users {
            match self.api.get_entries(user.id, &self.config.range).await {
                Ok(entries) => {
                    info!("[OK]: {}", user.id);
                    timesheets.insert(user.id, aggregate_entries(&self.config.range, &entries));
                }
                Err(e) => error!("[FAILED]: {} ({e})", user.id),
            }
        }
        timesheets
    }

    /// Manual CC list, plus every resolved user's address when the cc_users
    /// flag is set. The same address can arrive through both routes, so the
    /// result is deduplicated, first occurrence wins.
    fn resolve_cc(&self, users: &[User]) -> Vec<String> {
        let mut cc = self.config.cc.clone();
        if self.config.cc_users {
            cc.extend(users.iter().map(|user| user.email.clone()));
        }

        let mut seen = HashSet::new();
        cc.retain(|address| seen.insert(address.clone()));
        cc
    }

    async fn dispatch(&self, report: Report, users: &[User]) {
        info!("Sending blame email...");

        let envelope = Envelope {
            from: self.config.email_from.clone(),
            to: self.config.email_to.clone(),
            cc: self.resolve_cc(users),
            subject: report.subject,
            html: report.html,
        };

        match self.mailer.send(&envelope).await {
            Ok(()) => info!("Mail sent successfully."),
            Err(e) => error!("Mail not successful. Check your settings. ({e})"),
        }
    }
}

/// Dense per-day aggregation: every day in the range gets a bucket, entry
/// hours are truncated to whole hours, and same-day entries sum. Entries
/// dated outside the range are ignored.
pub fn aggregate_entries(range: &DateRange, entries: &[DayEntry]) -> DailyHours {
    let mut timesheet: DailyHours = range.days().map(|day| (day, 0)).collect();

    for entry in entries {
        if let Some(bucket) = timesheet.get_mut(&entry.spent_date) {
            *bucket += entry.hours.trunc() as u32;
        }
    }

    timesheet
}

//! Recurring contract reminders: weekly, weekday-only, fixed local time.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use chrono_tz::Tz;
use cron::Schedule;
use tokio::sync::{Mutex, Notify, watch};
use tracing::{info, warn};

use crate::chatbot::texts;
use crate::chatbot::transport::Transport;

/// An armed reminder for one contact.
#[derive(Debug, Clone)]
pub struct Reminder {
    pub contact_id: i64,
    pub subject_name: String,
    pub next_fire_at: DateTime<Utc>,
}

/// Owns the reminder job table and the loop that drains it.
///
/// At most one job per contact. Jobs fire at the configured local time on
/// weekdays and re-arm weekly; the next fire time is recomputed from the
/// weekday rule on every re-arm, never from a bare fixed-period timer.
pub struct ReminderScheduler {
    jobs: Mutex<HashMap<i64, Reminder>>,
    /// Wakes the run loop whenever the job table changes.
    changed: Notify,
    transport: Arc<dyn Transport>,
    /// Next weekday occurrence of the configured time-of-day.
    schedule: Schedule,
    tz: Tz,
    hour: u32,
    minute: u32,
}

impl ReminderScheduler {
    /// `hour`/`minute` must be a valid time-of-day (config validates).
    pub fn new(transport: Arc<dyn Transport>, tz: Tz, hour: u32, minute: u32) -> Arc<Self> {
        // cron crate uses 7-field format: sec min hour day month dow year
        let expr = format!("0 {minute} {hour} * * Mon-Fri *");
        let schedule = Schedule::from_str(&expr).expect("weekday cron expression is valid");

        Arc::new(Self {
            jobs: Mutex::new(HashMap::new()),
            changed: Notify::new(),
            transport,
            schedule,
            tz,
            hour,
            minute,
        })
    }

    /// Local time-of-day the reminders fire at.
    pub fn fire_time(&self) -> (u32, u32) {
        (self.hour, self.minute)
    }

    /// Next weekday occurrence of the configured time strictly after `now`.
    pub fn first_fire_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local = now.with_timezone(&self.tz);
        self.schedule
            .after(&local)
            .next()
            .map(|dt| dt.with_timezone(&Utc))
            .expect("a Mon-Fri schedule always has a future occurrence")
    }

    /// Weekly re-arm: one week after the previous fire, skipping forward
    /// past weekend days. Applied on every fire so the schedule cannot
    /// drift onto a weekend over multi-week spans.
    fn rearm_after(&self, prev: DateTime<Utc>) -> DateTime<Utc> {
        let mut local = prev.with_timezone(&self.tz) + Duration::weeks(1);
        while matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            local += Duration::days(1);
        }
        local.with_timezone(&Utc)
    }

    /// Arm the reminder for a contact, replacing any previous job. The
    /// conversation flow funnels contacts with an active reminder into the
    /// remove/back sub-menu, so replacement is not reachable from chat.
    pub async fn schedule(&self, contact_id: i64, subject_name: &str) -> Reminder {
        let reminder = Reminder {
            contact_id,
            subject_name: subject_name.to_string(),
            next_fire_at: self.first_fire_after(Utc::now()),
        };
        {
            let mut jobs = self.jobs.lock().await;
            jobs.insert(contact_id, reminder.clone());
        }
        self.changed.notify_waiters();
        info!(
            "Reminder armed for {} ({}), first fire {}",
            contact_id,
            subject_name,
            reminder.next_fire_at.with_timezone(&self.tz).format("%Y-%m-%d %H:%M")
        );
        reminder
    }

    /// Deactivate and remove the contact's job. Returns whether one
    /// existed. A fire already in flight may still complete its send, but
    /// no further fire occurs.
    pub async fn cancel(&self, contact_id: i64) -> bool {
        let existed = self.jobs.lock().await.remove(&contact_id).is_some();
        if existed {
            self.changed.notify_waiters();
            info!("Reminder cancelled for {contact_id}");
        }
        existed
    }

    pub async fn get(&self, contact_id: i64) -> Option<Reminder> {
        self.jobs.lock().await.get(&contact_id).cloned()
    }

    /// Snapshot of all jobs, earliest fire first.
    pub async fn list(&self) -> Vec<Reminder> {
        let mut reminders: Vec<Reminder> = self.jobs.lock().await.values().cloned().collect();
        reminders.sort_by_key(|r| r.next_fire_at);
        reminders
    }

    /// Fire every job due at `now`. Due jobs are popped and re-armed
    /// atomically under the job-table lock, then sent outside it: a cancel
    /// racing a fire either removes the job before the pop (nothing sent)
    /// or after the re-arm (the in-flight send completes, nothing after).
    /// Returns the number of successful sends.
    pub async fn fire_due(&self, now: DateTime<Utc>) -> usize {
        let due: Vec<Reminder> = {
            let mut jobs = self.jobs.lock().await;
            let mut due = Vec::new();
            for job in jobs.values_mut() {
                if job.next_fire_at <= now {
                    due.push(job.clone());
                    job.next_fire_at = self.rearm_after(job.next_fire_at);
                }
            }
            due
        };

        // Scheduling already targets weekdays; the guard covers fires that
        // were delayed across midnight into a weekend. Skipped jobs stay
        // armed.
        let weekend = matches!(
            now.with_timezone(&self.tz).weekday(),
            Weekday::Sat | Weekday::Sun
        );

        let mut sent = 0;
        for job in due {
            if weekend {
                info!("Skipping weekend fire for {}", job.contact_id);
                continue;
            }
            let text = texts::reminder_message(&job.subject_name);
            match self.transport.send_text(job.contact_id, &text).await {
                Ok(()) => {
                    info!("Reminder sent to {} ({})", job.contact_id, job.subject_name);
                    sent += 1;
                }
                // Send failures do not cancel the schedule; the job stays
                // armed for the next period.
                Err(e) => warn!("Reminder send to {} failed: {e}", job.contact_id),
            }
        }
        sent
    }

    /// Background loop: sleep until the earliest deadline, fire due jobs,
    /// repeat. Woken early when the job table changes or on shutdown.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        loop {
            // Created before the deadline is read, so an insert landing
            // between the read and the await still wakes the loop.
            let changed = self.changed.notified();
            tokio::pin!(changed);

            let next = self.jobs.lock().await.values().map(|j| j.next_fire_at).min();

            tokio::select! {
                _ = &mut changed => {}
                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                () = async {
                    match next {
                        Some(deadline) => {
                            let wait = (deadline - Utc::now())
                                .to_std()
                                .unwrap_or_default();
                            tokio::time::sleep(wait).await;
                        }
                        None => std::future::pending::<()>().await,
                    }
                } => {
                    self.fire_due(Utc::now()).await;
                }
            }
        }
        info!("Reminder scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use chrono_tz::America::Sao_Paulo;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTransport {
        sends: AtomicUsize,
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn send_text(&self, _contact_id: i64, _text: &str) -> Result<(), String> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn send_menu(
            &self,
            _contact_id: i64,
            _body: &str,
            _options: &[crate::chatbot::transport::MenuOption],
        ) -> Result<(), String> {
            Ok(())
        }
    }

    fn scheduler() -> (Arc<ReminderScheduler>, Arc<CountingTransport>) {
        let transport = Arc::new(CountingTransport { sends: AtomicUsize::new(0) });
        let scheduler = ReminderScheduler::new(transport.clone(), Sao_Paulo, 15, 30);
        (scheduler, transport)
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Sao_Paulo
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    // 2026-08-03 is a Monday.

    #[test]
    fn test_first_fire_same_day_before_hour() {
        let (scheduler, _) = scheduler();
        // Wednesday 10:00 -> Wednesday 15:30
        let fire = scheduler.first_fire_after(local(2026, 8, 5, 10, 0));
        assert_eq!(fire, local(2026, 8, 5, 15, 30));
    }

    #[test]
    fn test_first_fire_next_day_after_hour() {
        let (scheduler, _) = scheduler();
        // Wednesday 16:00 -> Thursday 15:30
        let fire = scheduler.first_fire_after(local(2026, 8, 5, 16, 0));
        assert_eq!(fire, local(2026, 8, 6, 15, 30));
    }

    #[test]
    fn test_first_fire_skips_weekend() {
        let (scheduler, _) = scheduler();
        // Friday 16:00 -> Monday 15:30
        let fire = scheduler.first_fire_after(local(2026, 8, 7, 16, 0));
        assert_eq!(fire, local(2026, 8, 10, 15, 30));
    }

    #[test]
    fn test_first_fire_on_saturday() {
        let (scheduler, _) = scheduler();
        let fire = scheduler.first_fire_after(local(2026, 8, 8, 9, 0));
        assert_eq!(fire, local(2026, 8, 10, 15, 30));
    }

    #[test]
    fn test_first_fire_is_strictly_after_now() {
        let (scheduler, _) = scheduler();
        // Exactly at the fire time on a Friday -> next weekday, Monday.
        let fire = scheduler.first_fire_after(local(2026, 8, 7, 15, 30));
        assert_eq!(fire, local(2026, 8, 10, 15, 30));
    }

    #[test]
    fn test_rearm_keeps_weekday() {
        let (scheduler, _) = scheduler();
        // Monday + 1 week -> next Monday
        let next = scheduler.rearm_after(local(2026, 8, 3, 15, 30));
        assert_eq!(next, local(2026, 8, 10, 15, 30));
    }

    #[test]
    fn test_rearm_skips_weekend() {
        let (scheduler, _) = scheduler();
        // A Saturday anchor (never produced by scheduling, but the rule
        // must correct it) lands on the following Monday.
        let next = scheduler.rearm_after(local(2026, 8, 8, 15, 30));
        assert_eq!(next, local(2026, 8, 17, 15, 30));
    }

    #[tokio::test]
    async fn test_schedule_then_cancel_leaves_nothing() {
        let (scheduler, transport) = scheduler();

        scheduler.schedule(5, "Maria Silva").await;
        assert!(scheduler.cancel(5).await);
        assert!(scheduler.get(5).await.is_none());
        assert!(!scheduler.cancel(5).await);

        // A fire for the cancelled job is a no-op.
        let far_future = Utc::now() + Duration::weeks(10);
        assert_eq!(scheduler.fire_due(far_future).await, 0);
        assert_eq!(transport.sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fire_sends_and_rearms_weekly() {
        let (scheduler, transport) = scheduler();

        let armed = scheduler.schedule(5, "Maria Silva").await;
        let fired = scheduler.fire_due(armed.next_fire_at).await;
        assert_eq!(fired, 1);
        assert_eq!(transport.sends.load(Ordering::SeqCst), 1);

        let rearmed = scheduler.get(5).await.expect("job stays armed");
        assert_eq!(rearmed.next_fire_at, armed.next_fire_at + Duration::weeks(1));
    }

    #[tokio::test]
    async fn test_fire_due_ignores_future_jobs() {
        let (scheduler, transport) = scheduler();

        scheduler.schedule(5, "Maria Silva").await;
        assert_eq!(scheduler.fire_due(Utc::now()).await, 0);
        assert_eq!(transport.sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_schedule_replaces_existing_job() {
        let (scheduler, _) = scheduler();

        scheduler.schedule(5, "Maria Silva").await;
        scheduler.schedule(5, "João Souza").await;

        let jobs = scheduler.list().await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].subject_name, "João Souza");
    }

    #[tokio::test]
    async fn test_send_failure_keeps_job_armed() {
        struct FailingTransport;

        #[async_trait]
        impl Transport for FailingTransport {
            async fn send_text(&self, _c: i64, _t: &str) -> Result<(), String> {
                Err("transport down".to_string())
            }
            async fn send_menu(
                &self,
                _c: i64,
                _b: &str,
                _o: &[crate::chatbot::transport::MenuOption],
            ) -> Result<(), String> {
                Err("transport down".to_string())
            }
        }

        let scheduler = ReminderScheduler::new(Arc::new(FailingTransport), Sao_Paulo, 15, 30);
        let armed = scheduler.schedule(5, "Maria Silva").await;

        assert_eq!(scheduler.fire_due(armed.next_fire_at).await, 0);
        let rearmed = scheduler.get(5).await.expect("job survives send failure");
        assert!(rearmed.next_fire_at > armed.next_fire_at);
    }
}

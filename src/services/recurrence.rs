use jiff::Zoned;
use jiff::civil::Date;
use uuid::Uuid;

use crate::models::{
    collection::TaskCollection,
    task::{Recurrence, RecurrenceKind, Task},
};

/// Decides whether a template needs a fresh instance today.
///
/// `last_created` is the date of the newest instance, or of the template
/// itself when none exists yet. The template counts as today's occurrence
/// when it was authored today.
pub fn should_create(
    rule: &Recurrence,
    template_created: Date,
    last_created: Date,
    today: Date,
    instance_exists_today: bool,
) -> bool {
    if instance_exists_today || last_created == today {
        return false;
    }

    match rule.kind {
        RecurrenceKind::None => false,
        RecurrenceKind::Daily => {
            let interval = i64::from(rule.interval.unwrap_or(1).max(1));
            days_between(last_created, today) >= interval
        }
        RecurrenceKind::Weekly => {
            let Ok(weekday) = u8::try_from(today.weekday().to_sunday_zero_offset()) else {
                return false;
            };
            match &rule.days_of_week {
                Some(days) => days.contains(&weekday),
                None => today.weekday() == template_created.weekday(),
            }
        }
        RecurrenceKind::Monthly => {
            today.day() == last_created.day()
                && (today.year(), today.month()) != (last_created.year(), last_created.month())
        }
    }
}

/// Whole days from `from` to `to`
fn days_between(from: Date, to: Date) -> i64 {
    to.duration_since(from).as_hours() / 24
}

/// Materializes today's instances for every template that is due.
/// Returns the number of instances created.
pub fn expand(tasks: &mut TaskCollection, now: &Zoned) -> usize {
    let tz = now.time_zone().clone();
    let today = now.date();
    let local_date = |task: &Task| task.created_at.to_zoned(tz.clone()).date();

    let templates: Vec<Task> = tasks
        .iter()
        .filter(|(_, task)| task.is_template())
        .map(|(_, task)| task.clone())
        .collect();

    let mut created = 0;
    for template in templates {
        let instance_dates: Vec<Date> = tasks
            .iter()
            .filter(|(_, task)| task.parent_task_id == Some(template.id))
            .map(|(_, task)| local_date(task))
            .collect();

        let template_created = local_date(&template);
        let last_created = instance_dates
            .iter()
            .copied()
            .max()
            .unwrap_or(template_created);
        let instance_exists_today = instance_dates.contains(&today);

        if !should_create(
            &template.recurrence,
            template_created,
            last_created,
            today,
            instance_exists_today,
        ) {
            continue;
        }

        let Some(block) = tasks.block_of(template.id) else {
            continue;
        };

        let created_at = now
            .start_of_day()
            .map(|midnight| midnight.timestamp())
            .unwrap_or_else(|_| now.timestamp());
        let instance = Task {
            id: Uuid::new_v4(),
            completed: false,
            completed_at: None,
            created_at,
            parent_task_id: Some(template.id),
            ..template.clone()
        };

        tracing::debug!(template = %template.id, instance = %instance.id, %block, "created recurring instance");
        tasks.bucket_mut(block).push(instance);
        created += 1;
    }

    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TimeBlock;
    use jiff::civil::date;
    use jiff::tz::TimeZone;

    fn at(y: i16, m: i8, d: i8) -> Zoned {
        date(y, m, d).at(8, 30, 0, 0).to_zoned(TimeZone::UTC).unwrap()
    }

    fn template(recurrence: Recurrence, created: &Zoned) -> Task {
        Task {
            recurrence,
            ..Task::new("Take meds", created.timestamp())
        }
    }

    #[test]
    fn daily_respects_interval() {
        let rule = Recurrence::daily(2);
        let last = date(2026, 10, 15);

        assert!(!should_create(&rule, last, last, date(2026, 10, 16), false));
        assert!(should_create(&rule, last, last, date(2026, 10, 17), false));
    }

    #[test]
    fn weekly_only_on_listed_days() {
        // 2026-10-19 is a Monday
        let rule = Recurrence::weekly([1, 3]);
        let created = date(2026, 10, 1);

        assert!(should_create(&rule, created, created, date(2026, 10, 19), false));
        assert!(!should_create(&rule, created, created, date(2026, 10, 20), false));
        assert!(!should_create(&rule, created, created, date(2026, 10, 19), true));
    }

    #[test]
    fn weekly_without_days_follows_template_weekday() {
        let rule = Recurrence {
            kind: RecurrenceKind::Weekly,
            days_of_week: None,
            interval: None,
        };
        let created = date(2026, 10, 10);

        assert!(should_create(&rule, created, created, date(2026, 10, 17), false));
        assert!(!should_create(&rule, created, created, date(2026, 10, 18), false));
    }

    #[test]
    fn monthly_anchors_to_day_of_month() {
        let rule = Recurrence::monthly();
        let last = date(2026, 9, 17);

        assert!(should_create(&rule, last, last, date(2026, 10, 17), false));
        assert!(!should_create(&rule, last, last, date(2026, 10, 18), false));
        assert!(should_create(&rule, last, last, date(2027, 9, 17), false));
    }

    #[test]
    fn template_authored_today_is_todays_occurrence() {
        let today = date(2026, 10, 17);
        assert!(!should_create(&Recurrence::daily(1), today, today, today, false));
    }

    #[test]
    fn expand_creates_one_instance_per_day() {
        let mut tasks = TaskCollection::default();
        let t = template(Recurrence::daily(1), &at(2026, 10, 16));
        let template_id = t.id;
        tasks.evening.push(t);

        let today = at(2026, 10, 17);
        assert_eq!(expand(&mut tasks, &today), 1);
        assert_eq!(expand(&mut tasks, &today), 0);

        assert_eq!(tasks.evening.len(), 2);
        let instance = &tasks.evening[1];
        assert_eq!(instance.parent_task_id, Some(template_id));
        assert!(!instance.completed);
        assert!(instance.completed_at.is_none());
        assert_eq!(instance.created_at.to_string(), "2026-10-17T00:00:00Z");
    }

    #[test]
    fn expand_uses_newest_instance_and_skips_instances_as_templates() {
        let mut tasks = TaskCollection::default();
        let mut t = template(Recurrence::daily(1), &at(2026, 10, 10));
        t.completed = true;
        t.completed_at = Some(at(2026, 10, 10).timestamp());
        let template_id = t.id;
        tasks.morning.push(t);

        let mut instance = Task {
            parent_task_id: Some(template_id),
            recurrence: Recurrence::daily(1),
            ..Task::new("Take meds", at(2026, 10, 16).timestamp())
        };
        instance.completed = false;
        tasks.morning.push(instance);

        assert_eq!(expand(&mut tasks, &at(2026, 10, 17)), 1);
        let children = tasks
            .bucket(TimeBlock::Morning)
            .iter()
            .filter(|t| t.parent_task_id == Some(template_id))
            .count();
        assert_eq!(children, 2);
    }

    #[test]
    fn non_recurring_tasks_are_ignored() {
        let mut tasks = TaskCollection::default();
        tasks
            .afternoon
            .push(Task::new("One-off", at(2026, 10, 1).timestamp()));
        assert_eq!(expand(&mut tasks, &at(2026, 10, 17)), 0);
    }
}

//! Recency bucketing for the conversation sidebar.
//!
//! Conversations are grouped by `lastDate` against midnight-aligned
//! boundaries computed from the current time, with the French labels the
//! client renders verbatim.

use causerie_core::Conversation;
use chrono::{DateTime, Days, NaiveTime, Utc};
use serde::Serialize;

pub const LABEL_TODAY: &str = "Aujourd'hui";
pub const LABEL_YESTERDAY: &str = "Hier";
pub const LABEL_LAST_7: &str = "Les 7 derniers jours";
pub const LABEL_LAST_30: &str = "Les 30 derniers jours";
pub const LABEL_OLDER: &str = "Plus anciens";

/// One labelled group of conversations, newest first within the group.
#[derive(Debug, Serialize)]
pub struct ChatBucket {
    pub label: String,
    pub chats: Vec<Conversation>,
}

/// Group conversations into the five recency buckets. All buckets are
/// present, oldest-bucket last, possibly empty.
pub fn bucket_conversations(
    conversations: Vec<Conversation>,
    now: DateTime<Utc>,
) -> Vec<ChatBucket> {
    let today = now.with_time(NaiveTime::MIN).single().unwrap_or(now);
    let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);
    let week_ago = today.checked_sub_days(Days::new(7)).unwrap_or(today);
    let month_ago = today.checked_sub_days(Days::new(30)).unwrap_or(today);

    let mut buckets: Vec<ChatBucket> = [
        LABEL_TODAY,
        LABEL_YESTERDAY,
        LABEL_LAST_7,
        LABEL_LAST_30,
        LABEL_OLDER,
    ]
    .iter()
    .map(|label| ChatBucket {
        label: label.to_string(),
        chats: Vec::new(),
    })
    .collect();

    for conversation in conversations {
        let slot = if conversation.last_date >= today {
            0
        } else if conversation.last_date >= yesterday {
            1
        } else if conversation.last_date >= week_ago {
            2
        } else if conversation.last_date >= month_ago {
            3
        } else {
            4
        };
        buckets[slot].chats.push(conversation);
    }

    for bucket in &mut buckets {
        bucket.chats.sort_by(|a, b| b.last_date.cmp(&a.last_date));
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use causerie_core::ChatId;
    use chrono::Duration;

    fn conversation(id: &str, last_date: DateTime<Utc>) -> Conversation {
        let mut conv = Conversation::new(ChatId::from(id), "t", "m");
        conv.last_date = last_date;
        conv
    }

    fn find<'a>(buckets: &'a [ChatBucket], label: &str) -> &'a ChatBucket {
        buckets.iter().find(|b| b.label == label).unwrap()
    }

    #[test]
    fn buckets_by_age() {
        let now = Utc::now();
        let buckets = bucket_conversations(
            vec![
                conversation("fresh", now),
                conversation("recent", now - Duration::days(2)),
                conversation("ancient", now - Duration::days(40)),
            ],
            now,
        );

        assert_eq!(find(&buckets, LABEL_TODAY).chats[0].id.as_str(), "fresh");
        assert_eq!(find(&buckets, LABEL_LAST_7).chats[0].id.as_str(), "recent");
        assert_eq!(find(&buckets, LABEL_OLDER).chats[0].id.as_str(), "ancient");
    }

    #[test]
    fn yesterday_is_midnight_aligned() {
        // 01:00 today: one hour ago is still today, 90 minutes before
        // midnight is yesterday
        let now = Utc::now()
            .with_time(NaiveTime::from_hms_opt(1, 0, 0).unwrap())
            .single()
            .unwrap();
        let buckets = bucket_conversations(
            vec![
                conversation("late-night", now - Duration::minutes(30)),
                conversation("before-midnight", now - Duration::minutes(90)),
            ],
            now,
        );

        assert_eq!(
            find(&buckets, LABEL_TODAY).chats[0].id.as_str(),
            "late-night"
        );
        assert_eq!(
            find(&buckets, LABEL_YESTERDAY).chats[0].id.as_str(),
            "before-midnight"
        );
    }

    #[test]
    fn thirty_day_edge() {
        let now = Utc::now();
        let buckets = bucket_conversations(
            vec![
                conversation("in-month", now - Duration::days(20)),
                conversation("out-of-month", now - Duration::days(31)),
            ],
            now,
        );

        assert_eq!(
            find(&buckets, LABEL_LAST_30).chats[0].id.as_str(),
            "in-month"
        );
        assert_eq!(find(&buckets, LABEL_OLDER).chats[0].id.as_str(), "out-of-month");
    }

    #[test]
    fn all_buckets_always_present() {
        let buckets = bucket_conversations(vec![], Utc::now());
        let labels: Vec<_> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                LABEL_TODAY,
                LABEL_YESTERDAY,
                LABEL_LAST_7,
                LABEL_LAST_30,
                LABEL_OLDER
            ]
        );
        assert!(buckets.iter().all(|b| b.chats.is_empty()));
    }

    #[test]
    fn newest_first_within_bucket() {
        let now = Utc::now();
        let buckets = bucket_conversations(
            vec![
                conversation("older", now - Duration::days(41)),
                conversation("newer", now - Duration::days(40)),
            ],
            now,
        );
        let older_bucket = find(&buckets, LABEL_OLDER);
        assert_eq!(older_bucket.chats[0].id.as_str(), "newer");
        assert_eq!(older_bucket.chats[1].id.as_str(), "older");
    }
}

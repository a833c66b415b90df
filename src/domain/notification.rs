use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotificationList {
    pub notifications: Vec<Notification>,
    pub unread_count: u32,
}

impl NotificationList {
    pub fn unread(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter().filter(|n| !n.read)
    }
}

/// Body for `PATCH /api/notifications`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarkRead {
    Ids { ids: Vec<String> },
    All { all: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_read_bodies() {
        let ids = MarkRead::Ids {
            ids: vec!["n1".into()],
        };
        assert_eq!(
            serde_json::to_value(&ids).unwrap(),
            serde_json::json!({ "ids": ["n1"] })
        );
        assert_eq!(
            serde_json::to_value(MarkRead::All { all: true }).unwrap(),
            serde_json::json!({ "all": true })
        );
    }

    #[test]
    fn test_unread_filter() {
        let list: NotificationList = serde_json::from_str(
            r#"{"notifications":[
                {"id":"1","title":"New submission","read":false},
                {"id":"2","title":"Issue published","read":true}
            ],"unread_count":1}"#,
        )
        .unwrap();
        let unread: Vec<_> = list.unread().map(|n| n.id.as_str()).collect();
        assert_eq!(unread, vec!["1"]);
    }
}

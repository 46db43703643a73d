use crate::constants::{ContentType, NotificationType, PlanStatus, ReactionType, WeightMode};
use chrono::NaiveDate;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
  pub title: String,
  #[serde(default)]
  pub resources: String,
  #[serde(default)]
  pub completed: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LearningPlan {
  pub id: String,
  pub user_email: String,
  pub title: String,
  pub description: String,
  pub start_date: Option<NaiveDate>,
  pub end_date: Option<NaiveDate>,
  pub topics: Vec<Topic>,
  pub progress: i32,
  pub status: PlanStatus,
  pub shared: bool,
  pub enrolled_users: Vec<String>,
  pub source_plan_id: Option<String>,
  pub created_at: i64,
  pub updated_at: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlanProgress {
  pub plan_id: String,
  pub progress: i32,
  pub completed_topics: usize,
  pub total_topics: usize,
  pub status: PlanStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgress {
  pub topic_id: String,
  #[serde(default)]
  pub topic_name: String,
  #[serde(default)]
  pub percentage: f64,
  #[serde(default)]
  pub current_progress: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomItem {
  #[serde(default)]
  pub id: String,
  pub name: String,
  // custom items can hang off of a topic in the topic-grouped modes.
  #[serde(default)]
  pub topic_id: Option<String>,
  #[serde(default)]
  pub percentage: f64,
  #[serde(default)]
  pub current_progress: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProgressTemplate {
  pub id: String,
  pub user_id: String,
  pub course_id: String,
  pub learning_plan_id: Option<String>,
  pub topics: Vec<TopicProgress>,
  pub custom_items: Vec<CustomItem>,
  pub weighting: WeightMode,
  pub total_progress: f64,
  pub is_active: bool,
  pub created_at: i64,
  pub updated_at: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Post {
  pub id: String,
  pub user_email: String,
  pub title: String,
  pub content: String,
  pub created_at: i64,
  pub updated_at: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
  pub id: String,
  pub post_id: String,
  pub user_id: String,
  pub username: String,
  pub text: String,
  pub parent_id: Option<String>,
  pub hidden: bool,
  pub created_at: i64,
  pub updated_at: i64,
  pub replies: Vec<Comment>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
  pub id: String,
  pub user_id: String,
  pub content_id: String,
  pub content_type: ContentType,
  pub reaction_type: ReactionType,
  pub created_at: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReactionCounts {
  pub likes: i64,
  pub dislikes: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
  pub id: String,
  pub user_id: String,
  #[serde(rename = "type")]
  pub notification_type: NotificationType,
  pub message: String,
  pub related_id: String,
  pub course_id: Option<String>,
  pub read: bool,
  pub created_at: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UnreadCount {
  pub count: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MarkedRead {
  pub count: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserReaction {
  pub reaction_type: Option<ReactionType>,
}

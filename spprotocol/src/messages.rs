// request bodies.
use crate::constants::{PlanStatus, ReactionType, WeightMode};
use crate::content::{CustomItem, Topic, TopicProgress};
use chrono::NaiveDate;

// fields are optional so missing ones come back as validation errors
// rather than deserialization failures.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SaveLearningPlan {
  pub title: Option<String>,
  #[serde(default)]
  pub description: Option<String>,
  pub start_date: Option<NaiveDate>,
  pub end_date: Option<NaiveDate>,
  #[serde(default)]
  pub topics: Vec<Topic>,
  #[serde(default)]
  pub shared: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct LearningPlanPatch {
  #[serde(default)]
  pub id: Option<String>,
  pub title: Option<String>,
  pub description: Option<String>,
  pub start_date: Option<NaiveDate>,
  pub end_date: Option<NaiveDate>,
  pub topics: Option<Vec<Topic>>,
  pub shared: Option<bool>,
  pub status: Option<PlanStatus>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StartPlan {
  pub plan_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgressUpdate {
  pub plan_id: String,
  pub topic_index: i64,
  pub completed: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SaveProgressTemplate {
  pub course_id: Option<String>,
  #[serde(default)]
  pub learning_plan_id: Option<String>,
  #[serde(default)]
  pub topics: Vec<TopicProgress>,
  #[serde(default)]
  pub custom_items: Vec<CustomItem>,
  #[serde(default)]
  pub weighting: WeightMode,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SavePost {
  pub title: Option<String>,
  pub content: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
  pub title: Option<String>,
  pub content: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SaveComment {
  pub post_id: Option<String>,
  // when present, must match the logged in user.
  #[serde(default)]
  pub user_id: Option<String>,
  pub username: Option<String>,
  pub text: Option<String>,
  #[serde(default)]
  pub parent_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CommentUpdate {
  pub text: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReactionQuery {
  pub reaction_type: ReactionType,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct EmailQuery {
  pub email: Option<String>,
}

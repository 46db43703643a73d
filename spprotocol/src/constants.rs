use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValue {
  pub kind: &'static str,
  pub value: String,
}

impl fmt::Display for UnknownValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "unknown {}: '{}'", self.kind, self.value)
  }
}

impl std::error::Error for UnknownValue {}

fn unknown<T>(kind: &'static str, value: &str) -> Result<T, UnknownValue> {
  Err(UnknownValue {
    kind,
    value: value.to_string(),
  })
}

// things that can be reacted to or commented on.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
  #[serde(alias = "LEARNING_PLAN")]
  Course,
  Post,
  Comment,
}

impl ContentType {
  pub fn str(&self) -> &str {
    match *self {
      ContentType::Course => "COURSE",
      ContentType::Post => "POST",
      ContentType::Comment => "COMMENT",
    }
  }

  // how the content is named in notification messages.
  pub fn noun(&self) -> &str {
    match *self {
      ContentType::Course => "course",
      ContentType::Post => "post",
      ContentType::Comment => "comment",
    }
  }
}

impl FromStr for ContentType {
  type Err = UnknownValue;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_uppercase().as_str() {
      "COURSE" | "LEARNING_PLAN" => Ok(ContentType::Course),
      "POST" => Ok(ContentType::Post),
      "COMMENT" => Ok(ContentType::Comment),
      _ => unknown("content type", s),
    }
  }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReactionType {
  Like,
  Dislike,
}

impl ReactionType {
  pub fn str(&self) -> &str {
    match *self {
      ReactionType::Like => "LIKE",
      ReactionType::Dislike => "DISLIKE",
    }
  }

  pub fn verb(&self) -> &str {
    match *self {
      ReactionType::Like => "liked",
      ReactionType::Dislike => "disliked",
    }
  }

  pub fn noun(&self) -> &str {
    match *self {
      ReactionType::Like => "like",
      ReactionType::Dislike => "dislike",
    }
  }
}

impl FromStr for ReactionType {
  type Err = UnknownValue;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_uppercase().as_str() {
      "LIKE" => Ok(ReactionType::Like),
      "DISLIKE" => Ok(ReactionType::Dislike),
      _ => unknown("reaction type", s),
    }
  }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
  CourseReaction,
  PostReaction,
  CommentReaction,
  ReactionChanged,
  ReactionRemoved,
  CommentReply,
  CourseComment,
  PlanEnrollment,
  PlanCompleted,
}

impl NotificationType {
  pub fn str(&self) -> &str {
    match *self {
      NotificationType::CourseReaction => "COURSE_REACTION",
      NotificationType::PostReaction => "POST_REACTION",
      NotificationType::CommentReaction => "COMMENT_REACTION",
      NotificationType::ReactionChanged => "REACTION_CHANGED",
      NotificationType::ReactionRemoved => "REACTION_REMOVED",
      NotificationType::CommentReply => "COMMENT_REPLY",
      NotificationType::CourseComment => "COURSE_COMMENT",
      NotificationType::PlanEnrollment => "PLAN_ENROLLMENT",
      NotificationType::PlanCompleted => "PLAN_COMPLETED",
    }
  }

  // new-reaction notification type for a given kind of content.
  pub fn reaction_on(ct: ContentType) -> NotificationType {
    match ct {
      ContentType::Course => NotificationType::CourseReaction,
      ContentType::Post => NotificationType::PostReaction,
      ContentType::Comment => NotificationType::CommentReaction,
    }
  }
}

impl FromStr for NotificationType {
  type Err = UnknownValue;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "COURSE_REACTION" => Ok(NotificationType::CourseReaction),
      "POST_REACTION" => Ok(NotificationType::PostReaction),
      "COMMENT_REACTION" => Ok(NotificationType::CommentReaction),
      "REACTION_CHANGED" => Ok(NotificationType::ReactionChanged),
      "REACTION_REMOVED" => Ok(NotificationType::ReactionRemoved),
      "COMMENT_REPLY" => Ok(NotificationType::CommentReply),
      "COURSE_COMMENT" => Ok(NotificationType::CourseComment),
      "PLAN_ENROLLMENT" => Ok(NotificationType::PlanEnrollment),
      "PLAN_COMPLETED" => Ok(NotificationType::PlanCompleted),
      _ => unknown("notification type", s),
    }
  }
}

// plan lifecycle.  CREATED -> IN_PROGRESS -> COMPLETED | ABANDONED
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
  Created,
  InProgress,
  Completed,
  Abandoned,
}

impl PlanStatus {
  pub fn str(&self) -> &str {
    match *self {
      PlanStatus::Created => "CREATED",
      PlanStatus::InProgress => "IN_PROGRESS",
      PlanStatus::Completed => "COMPLETED",
      PlanStatus::Abandoned => "ABANDONED",
    }
  }
}

impl Default for PlanStatus {
  fn default() -> Self {
    PlanStatus::Created
  }
}

impl FromStr for PlanStatus {
  type Err = UnknownValue;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_uppercase().as_str() {
      "CREATED" => Ok(PlanStatus::Created),
      "IN_PROGRESS" => Ok(PlanStatus::InProgress),
      "COMPLETED" => Ok(PlanStatus::Completed),
      "ABANDONED" => Ok(PlanStatus::Abandoned),
      _ => unknown("plan status", s),
    }
  }
}

// how a progress template distributes its 100 percent.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeightMode {
  Equal,
  TopicTopDown,
  TopicBottomUp,
}

impl WeightMode {
  pub fn str(&self) -> &str {
    match *self {
      WeightMode::Equal => "EQUAL",
      WeightMode::TopicTopDown => "TOPIC_TOP_DOWN",
      WeightMode::TopicBottomUp => "TOPIC_BOTTOM_UP",
    }
  }
}

impl Default for WeightMode {
  fn default() -> Self {
    WeightMode::Equal
  }
}

impl FromStr for WeightMode {
  type Err = UnknownValue;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_uppercase().as_str() {
      "EQUAL" => Ok(WeightMode::Equal),
      "TOPIC_TOP_DOWN" => Ok(WeightMode::TopicTopDown),
      "TOPIC_BOTTOM_UP" => Ok(WeightMode::TopicBottomUp),
      _ => unknown("weight mode", s),
    }
  }
}

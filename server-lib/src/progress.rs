// Completion arithmetic for plans and progress templates.
use spprotocol::constants::{PlanStatus, WeightMode};
use spprotocol::content::{CustomItem, ProgressTemplate, Topic, TopicProgress};

// something that carries a weight and a 0-100 completion value.
pub trait WorkItem {
  fn percentage(&self) -> f64;
  fn set_percentage(&mut self, p: f64);
  fn current_progress(&self) -> f64;
  fn set_current_progress(&mut self, p: f64);
}

impl WorkItem for TopicProgress {
  fn percentage(&self) -> f64 {
    self.percentage
  }
  fn set_percentage(&mut self, p: f64) {
    self.percentage = p;
  }
  fn current_progress(&self) -> f64 {
    self.current_progress
  }
  fn set_current_progress(&mut self, p: f64) {
    self.current_progress = p;
  }
}

impl WorkItem for CustomItem {
  fn percentage(&self) -> f64 {
    self.percentage
  }
  fn set_percentage(&mut self, p: f64) {
    self.percentage = p;
  }
  fn current_progress(&self) -> f64 {
    self.current_progress
  }
  fn set_current_progress(&mut self, p: f64) {
    self.current_progress = p;
  }
}

pub fn clamp_progress(p: f64) -> f64 {
  if p.is_nan() {
    0.0
  } else {
    p.max(0.0).min(100.0)
  }
}

// round(100 * completed / total), 0 for no topics.
pub fn plan_progress(topics: &[Topic]) -> i32 {
  if topics.is_empty() {
    0
  } else {
    let done = topics.iter().filter(|t| t.completed).count();
    (100.0 * done as f64 / topics.len() as f64).round() as i32
  }
}

// status after a progress recompute.  ABANDONED sticks until explicitly resumed.
pub fn next_status(current: PlanStatus, progress: i32) -> PlanStatus {
  match current {
    PlanStatus::Abandoned => PlanStatus::Abandoned,
    _ if progress >= 100 => PlanStatus::Completed,
    _ if progress > 0 => PlanStatus::InProgress,
    PlanStatus::Created => PlanStatus::Created,
    _ => PlanStatus::InProgress,
  }
}

fn weighted(item: &dyn WorkItem) -> f64 {
  item.current_progress() * item.percentage() / 100.0
}

// indexes of the custom items grouped under topic i.
fn children(topic: &TopicProgress, items: &[CustomItem]) -> Vec<usize> {
  items
    .iter()
    .enumerate()
    .filter(|(_, c)| c.topic_id.as_deref() == Some(topic.topic_id.as_str()))
    .map(|(i, _)| i)
    .collect()
}

fn is_orphan(item: &CustomItem, topics: &[TopicProgress]) -> bool {
  match &item.topic_id {
    None => true,
    Some(tid) => !topics.iter().any(|t| t.topic_id == *tid),
  }
}

// the items that count directly toward the total.
fn leaves(t: &ProgressTemplate) -> Vec<&dyn WorkItem> {
  let mut lv: Vec<&dyn WorkItem> = Vec::new();
  match t.weighting {
    WeightMode::Equal => {
      lv.extend(t.topics.iter().map(|x| x as &dyn WorkItem));
    }
    WeightMode::TopicTopDown | WeightMode::TopicBottomUp => {
      lv.extend(
        t.topics
          .iter()
          .filter(|x| children(x, &t.custom_items).is_empty())
          .map(|x| x as &dyn WorkItem),
      );
    }
  }
  lv.extend(t.custom_items.iter().map(|x| x as &dyn WorkItem));
  lv
}

pub fn total_progress(t: &ProgressTemplate) -> f64 {
  leaves(t).into_iter().map(weighted).sum()
}

pub fn weight_sum(t: &ProgressTemplate) -> f64 {
  leaves(t).into_iter().map(|x| x.percentage()).sum()
}

fn zero_weights(t: &mut ProgressTemplate) {
  for x in t.topics.iter_mut() {
    x.set_percentage(0.0);
  }
  for x in t.custom_items.iter_mut() {
    x.set_percentage(0.0);
  }
}

fn equal_split(t: &mut ProgressTemplate) {
  let n = t.topics.len() + t.custom_items.len();
  if n == 0 {
    return;
  }
  let w = 100.0 / n as f64;
  for x in t.topics.iter_mut() {
    x.set_percentage(w);
  }
  for x in t.custom_items.iter_mut() {
    x.set_percentage(w);
  }
}

fn grouped_split(t: &mut ProgressTemplate, bottom_up: bool) {
  let kids: Vec<Vec<usize>> = t
    .topics
    .iter()
    .map(|x| children(x, &t.custom_items))
    .collect();
  let orphans: Vec<usize> = (0..t.custom_items.len())
    .filter(|i| is_orphan(&t.custom_items[*i], &t.topics))
    .collect();

  if bottom_up {
    let childless = kids.iter().filter(|k| k.is_empty()).count();
    let nleaves = childless + t.custom_items.len();
    if nleaves == 0 {
      return;
    }
    let w = 100.0 / nleaves as f64;
    for x in t.custom_items.iter_mut() {
      x.set_percentage(w);
    }
    for (i, k) in kids.iter().enumerate() {
      // a parent topic weighs what its children weigh.
      let pct = if k.is_empty() { w } else { w * k.len() as f64 };
      t.topics[i].set_percentage(pct);
    }
  } else {
    let ngroups = t.topics.len() + orphans.len();
    if ngroups == 0 {
      return;
    }
    let share = 100.0 / ngroups as f64;
    for o in orphans.iter() {
      t.custom_items[*o].set_percentage(share);
    }
    for (i, k) in kids.iter().enumerate() {
      t.topics[i].set_percentage(share);
      for c in k.iter() {
        t.custom_items[*c].set_percentage(share / k.len() as f64);
      }
    }
  }

  // parent topics report the weighted average of their children.
  for (i, k) in kids.iter().enumerate() {
    if k.is_empty() {
      continue;
    }
    let pct = t.topics[i].percentage();
    let sum: f64 = k.iter().map(|c| weighted(&t.custom_items[*c])).sum();
    let cp = if pct > 0.0 { 100.0 * sum / pct } else { 0.0 };
    t.topics[i].set_current_progress(clamp_progress(cp));
  }
}

// assign weights according to the template's mode, then recompute the total.
pub fn calculate_percentages(t: &mut ProgressTemplate) {
  for x in t.topics.iter_mut() {
    let cp = clamp_progress(x.current_progress());
    x.set_current_progress(cp);
  }
  for x in t.custom_items.iter_mut() {
    let cp = clamp_progress(x.current_progress());
    x.set_current_progress(cp);
  }

  zero_weights(t);
  match t.weighting {
    WeightMode::Equal => equal_split(t),
    WeightMode::TopicTopDown => grouped_split(t, false),
    WeightMode::TopicBottomUp => grouped_split(t, true),
  }

  t.total_progress = total_progress(t);
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::task::{Task, TimeBlock};

/// Current schema version of the persisted task collection
pub const TASKS_VERSION: u32 = 2;

/// Tasks bucketed by time block, each bucket in insertion order
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct TaskCollection {
    #[serde(default)]
    pub morning: Vec<Task>,
    #[serde(default)]
    pub afternoon: Vec<Task>,
    #[serde(default)]
    pub evening: Vec<Task>,
}

impl TaskCollection {
    pub fn bucket(&self, block: TimeBlock) -> &Vec<Task> {
        match block {
            TimeBlock::Morning => &self.morning,
            TimeBlock::Afternoon => &self.afternoon,
            TimeBlock::Evening => &self.evening,
        }
    }

    pub fn bucket_mut(&mut self, block: TimeBlock) -> &mut Vec<Task> {
        match block {
            TimeBlock::Morning => &mut self.morning,
            TimeBlock::Afternoon => &mut self.afternoon,
            TimeBlock::Evening => &mut self.evening,
        }
    }

    /// Every task paired with its block, morning first
    pub fn iter(&self) -> impl Iterator<Item = (TimeBlock, &Task)> {
        TimeBlock::ALL
            .into_iter()
            .flat_map(move |block| self.bucket(block).iter().map(move |t| (block, t)))
    }

    pub fn len(&self) -> usize {
        self.morning.len() + self.afternoon.len() + self.evening.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, block: TimeBlock, id: Uuid) -> Option<&Task> {
        self.bucket(block).iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, block: TimeBlock, id: Uuid) -> Option<&mut Task> {
        self.bucket_mut(block).iter_mut().find(|t| t.id == id)
    }

    /// Linear scan for the block currently holding `id`
    pub fn block_of(&self, id: Uuid) -> Option<TimeBlock> {
        self.iter()
            .find(|(_, task)| task.id == id)
            .map(|(block, _)| block)
    }

    /// Removes the task, returning it when it was present
    pub fn remove(&mut self, block: TimeBlock, id: Uuid) -> Option<Task> {
        let bucket = self.bucket_mut(block);
        let position = bucket.iter().position(|t| t.id == id)?;
        Some(bucket.remove(position))
    }
}

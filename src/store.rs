//! Board Task Cache
//!
//! Per-board task lists with optimistic mutation support. Each board entry is
//! independent so work on one board never touches another.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::models::{now_millis, sort_for_display, Placement, Task, TaskPatch, TaskStatus};
use crate::mutation::Reconcile;

#[derive(Debug, Default)]
struct BoardEntry {
    tasks: Vec<Task>,
    /// Mutation ids applied to `tasks` but not yet committed or rolled back
    pending: BTreeSet<u64>,
    /// Newest mutation ever applied to this entry
    last_applied: u64,
    version: u64,
    stale: bool,
}

/// Pre-mutation copy of one board entry
#[derive(Debug, Clone)]
pub struct Snapshot {
    board_id: u32,
    mutation_id: u64,
    tasks: Vec<Task>,
}

impl Snapshot {
    pub fn board_id(&self) -> u32 {
        self.board_id
    }

    pub fn mutation_id(&self) -> u64 {
        self.mutation_id
    }

    /// Tasks as they were before the mutation, unsorted
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }
}

/// Task cache keyed by board id
#[derive(Debug, Default)]
pub struct BoardCache {
    boards: DashMap<u32, BoardEntry>,
    next_mutation: AtomicU64,
}

impl BoardCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks of a board in display order. Empty if the board is not cached.
    pub fn get_tasks_for_board(&self, board_id: u32) -> Vec<Task> {
        let mut tasks = self
            .boards
            .get(&board_id)
            .map(|entry| entry.tasks.clone())
            .unwrap_or_default();
        sort_for_display(&mut tasks);
        tasks
    }

    /// One column of a board in display order
    pub fn tasks_in_section(&self, board_id: u32, section_id: Option<u32>) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .boards
            .get(&board_id)
            .map(|entry| {
                entry
                    .tasks
                    .iter()
                    .filter(|t| t.section_id == section_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        sort_for_display(&mut tasks);
        tasks
    }

    pub fn find_task(&self, board_id: u32, task_id: u32) -> Option<Task> {
        self.boards
            .get(&board_id)
            .and_then(|entry| entry.tasks.iter().find(|t| t.id == task_id).cloned())
    }

    /// Fill the entry for a board that was not loaded yet
    pub fn seed_board(&self, board_id: u32, tasks: Vec<Task>) {
        self.replace_board(board_id, tasks);
    }

    /// Overwrite the entry with a fresh server response. Outstanding mutations
    /// are forgotten: their later commit or rollback becomes a no-op.
    pub fn replace_board(&self, board_id: u32, tasks: Vec<Task>) {
        let mut entry = self.boards.entry(board_id).or_default();
        if !entry.pending.is_empty() {
            tracing::debug!(board_id, pending = entry.pending.len(), "refetch supersedes pending mutations");
        }
        entry.tasks = tasks;
        entry.pending.clear();
        entry.stale = false;
    }

    /// Mark a board as needing a refetch
    pub fn invalidate(&self, board_id: u32) {
        if let Some(mut entry) = self.boards.get_mut(&board_id) {
            entry.version += 1;
            entry.stale = true;
        }
    }

    pub fn is_stale(&self, board_id: u32) -> bool {
        self.boards.get(&board_id).map(|e| e.stale).unwrap_or(false)
    }

    pub fn version(&self, board_id: u32) -> u64 {
        self.boards.get(&board_id).map(|e| e.version).unwrap_or(0)
    }

    pub fn has_pending(&self, board_id: u32) -> bool {
        self.boards
            .get(&board_id)
            .map(|e| !e.pending.is_empty())
            .unwrap_or(false)
    }

    /// Patch a cached task wherever it lives. None if no cached board holds it.
    pub fn apply_optimistic_update(&self, task_id: u32, patch: &TaskPatch) -> Option<Snapshot> {
        // find the board first; holding an iterator guard while taking a
        // write guard on the same shard would deadlock
        let board_id = self
            .boards
            .iter()
            .find(|entry| entry.tasks.iter().any(|t| t.id == task_id))
            .map(|entry| *entry.key())?;
        self.apply_on_board(board_id, task_id, patch)
    }

    /// Patch a task on a known board and return the pre-patch entry.
    ///
    /// A patch that sets a display order renumbers the destination column
    /// 0..n with the task placed as the patch says. The source column keeps
    /// its orders.
    pub fn apply_on_board(&self, board_id: u32, task_id: u32, patch: &TaskPatch) -> Option<Snapshot> {
        let mut entry = self.boards.get_mut(&board_id)?;
        let idx = entry.tasks.iter().position(|t| t.id == task_id)?;

        let mutation_id = self.next_mutation.fetch_add(1, Ordering::Relaxed) + 1;
        let snapshot = Snapshot {
            board_id,
            mutation_id,
            tasks: entry.tasks.clone(),
        };

        patch.apply_to(&mut entry.tasks[idx], now_millis());
        if let Some(order) = patch.display_order {
            let section_id = entry.tasks[idx].section_id;
            place_in_column(&mut entry.tasks, idx, section_id, order, patch.placement);
        }
        entry.pending.insert(mutation_id);
        entry.last_applied = mutation_id;

        tracing::debug!(board_id, task_id, mutation_id, "optimistic update applied");
        Some(snapshot)
    }

    /// Replace the optimistic record with the server's. Returns false when the
    /// mutation is no longer outstanding.
    pub fn commit(&self, snapshot: &Snapshot, server_task: Task) -> bool {
        let Some(mut entry) = self.boards.get_mut(&snapshot.board_id) else {
            return false;
        };
        if !entry.pending.remove(&snapshot.mutation_id) {
            return false;
        }

        let task_id = server_task.id;
        if server_task.board_id == Some(snapshot.board_id) {
            match entry.tasks.iter().position(|t| t.id == task_id) {
                Some(idx) => entry.tasks[idx] = server_task,
                None => entry.tasks.push(server_task),
            }
        } else {
            entry.tasks.retain(|t| t.id != task_id);
        }
        tracing::debug!(board_id = snapshot.board_id, task_id, mutation_id = snapshot.mutation_id, "mutation committed");
        true
    }

    /// Restore the board to its pre-mutation state. Mutations applied after
    /// this one, committed or not, are undone with it and the board is marked
    /// stale. Returns false when the mutation is no longer outstanding.
    pub fn rollback(&self, snapshot: &Snapshot) -> bool {
        let Some(mut entry) = self.boards.get_mut(&snapshot.board_id) else {
            return false;
        };
        if !entry.pending.contains(&snapshot.mutation_id) {
            return false;
        }

        entry.pending.retain(|id| *id < snapshot.mutation_id);
        entry.tasks = snapshot.tasks.clone();
        let overtaken = entry.last_applied > snapshot.mutation_id;
        if overtaken {
            entry.version += 1;
            entry.stale = true;
        }
        tracing::debug!(
            board_id = snapshot.board_id,
            mutation_id = snapshot.mutation_id,
            overtaken,
            "mutation rolled back"
        );
        true
    }
}

/// Renumber the open tasks of a column 0..n with the task at `idx` placed
/// before the siblings at or after `order`, or after all of them.
fn place_in_column(tasks: &mut [Task], idx: usize, section_id: Option<u32>, order: i32, placement: Placement) {
    let mut column: Vec<usize> = (0..tasks.len())
        .filter(|&i| i != idx && tasks[i].section_id == section_id && tasks[i].status != TaskStatus::Archived)
        .collect();
    column.sort_by(|&a, &b| tasks[a].display_cmp(&tasks[b]));

    let at = match placement {
        Placement::MakeRoom => column.iter().filter(|&&i| tasks[i].display_order < order).count(),
        Placement::Append => column.len(),
    };
    column.insert(at, idx);
    for (pos, i) in column.into_iter().enumerate() {
        tasks[i].display_order = pos as i32;
    }
}

impl Reconcile<Task> for BoardCache {
    type Snapshot = Snapshot;

    fn commit(&self, snapshot: &Snapshot, authoritative: Task) -> bool {
        BoardCache::commit(self, snapshot, authoritative)
    }

    fn rollback(&self, snapshot: &Snapshot) -> bool {
        BoardCache::rollback(self, snapshot)
    }
}

//! Move Resolver
//!
//! Turns a completed drop into a section + order for the dragged task and
//! issues the single persistence call for it.

use std::sync::Arc;

use board_dragdrop::DropTarget;

use crate::commands::{ApiError, ApiResult, TaskApi};
use crate::models::{Placement, Task, TaskPatch};
use crate::mutation::OptimisticMutation;
use crate::store::BoardCache;

/// Where a drop puts the dragged task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePlan {
    pub board_id: u32,
    pub task_id: u32,
    pub section_id: Option<u32>,
    pub display_order: i32,
    /// Task drops make room before the target, section drops append
    pub placement: Placement,
}

impl MovePlan {
    pub fn patch(&self) -> TaskPatch {
        match self.placement {
            Placement::MakeRoom => TaskPatch::moved(self.section_id, self.display_order),
            Placement::Append => TaskPatch::appended(self.section_id, self.display_order),
        }
    }
}

pub struct MoveResolver {
    cache: Arc<BoardCache>,
    api: Arc<dyn TaskApi>,
}

impl MoveResolver {
    pub fn new(cache: Arc<BoardCache>, api: Arc<dyn TaskApi>) -> Self {
        Self { cache, api }
    }

    pub fn cache(&self) -> &Arc<BoardCache> {
        &self.cache
    }

    pub fn api(&self) -> &Arc<dyn TaskApi> {
        &self.api
    }

    /// Compute the move for a drop from the cache as it is now. None means
    /// the drop changes nothing (or refers to tasks not on this board).
    pub fn plan(&self, board_id: u32, dragged: u32, target: DropTarget) -> Option<MovePlan> {
        let task = self.cache.find_task(board_id, dragged)?;
        let (section_id, display_order, placement) = match target {
            DropTarget::Task(target_id) => {
                if target_id == dragged {
                    return None;
                }
                let target = self.cache.find_task(board_id, target_id)?;
                (target.section_id, target.display_order, Placement::MakeRoom)
            }
            DropTarget::Section(section_id) => {
                let column = self.cache.tasks_in_section(board_id, section_id);
                // already last in its own column, whatever its stored order
                if task.section_id == section_id && column.last().map(|t| t.id) == Some(dragged) {
                    return None;
                }
                let order = column.iter().filter(|t| t.id != dragged).count() as i32;
                (section_id, order, Placement::Append)
            }
        };
        Some(MovePlan {
            board_id,
            task_id: dragged,
            section_id,
            display_order,
            placement,
        })
    }

    /// Apply a drop: patch the cache, persist, then commit or roll back.
    /// Ok(None) when the drop was a no-op and nothing was sent.
    pub async fn resolve(&self, board_id: u32, dragged: u32, target: DropTarget) -> ApiResult<Option<Task>> {
        let Some(plan) = self.plan(board_id, dragged, target) else {
            tracing::debug!(board_id, task_id = dragged, ?target, "drop changes nothing");
            return Ok(None);
        };
        self.execute(plan).await.map(Some)
    }

    /// Persist a planned move with optimistic cache update
    pub async fn execute(&self, plan: MovePlan) -> ApiResult<Task> {
        let Some(snapshot) = self.cache.apply_on_board(plan.board_id, plan.task_id, &plan.patch()) else {
            return Err(ApiError::NotFound(format!(
                "Task {} is not cached on board {}",
                plan.task_id, plan.board_id
            )));
        };

        let call = match plan.placement {
            Placement::MakeRoom => self.api.move_task(plan.task_id, plan.section_id, plan.display_order),
            Placement::Append => self.api.append_task(plan.task_id, plan.section_id),
        };
        match OptimisticMutation::<Task, _>::begin(self.cache.as_ref(), snapshot).run(call).await {
            Ok(task) => {
                tracing::debug!(
                    board_id = plan.board_id,
                    task_id = task.id,
                    section_id = ?task.section_id,
                    order = task.display_order,
                    "task moved"
                );
                Ok(task)
            }
            Err(e) => {
                tracing::warn!(board_id = plan.board_id, task_id = plan.task_id, error = %e, "move failed, cache rolled back");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use npc_finder_backend::commands as backend;
    use npc_finder_backend::domain::{BoardAccess, BoardTemplate};
    use npc_finder_backend::AppState;

    use crate::commands::LocalTaskApi;
    use crate::models::Section;

    const OWNER: u32 = 1;
    const VIEWER: u32 = 2;

    /// Counts move calls before delegating
    struct CountingApi<A> {
        inner: A,
        moves: AtomicUsize,
    }

    impl<A> CountingApi<A> {
        fn new(inner: A) -> Self {
            Self { inner, moves: AtomicUsize::new(0) }
        }

        fn moves(&self) -> usize {
            self.moves.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl<A: TaskApi> TaskApi for CountingApi<A> {
        async fn move_task(&self, task_id: u32, section_id: Option<u32>, order: i32) -> ApiResult<Task> {
            self.moves.fetch_add(1, Ordering::SeqCst);
            self.inner.move_task(task_id, section_id, order).await
        }

        async fn append_task(&self, task_id: u32, section_id: Option<u32>) -> ApiResult<Task> {
            self.moves.fetch_add(1, Ordering::SeqCst);
            self.inner.append_task(task_id, section_id).await
        }

        async fn list_tasks(&self, board_id: u32) -> ApiResult<Vec<Task>> {
            self.inner.list_tasks(board_id).await
        }

        async fn list_sections(&self, board_id: u32) -> ApiResult<Vec<Section>> {
            self.inner.list_sections(board_id).await
        }
    }

    /// Network that is down
    struct OfflineApi;

    #[async_trait]
    impl TaskApi for OfflineApi {
        async fn move_task(&self, _: u32, _: Option<u32>, _: i32) -> ApiResult<Task> {
            Err(ApiError::Transport("connection reset".into()))
        }

        async fn append_task(&self, _: u32, _: Option<u32>) -> ApiResult<Task> {
            Err(ApiError::Transport("connection reset".into()))
        }

        async fn list_tasks(&self, _: u32) -> ApiResult<Vec<Task>> {
            Err(ApiError::Transport("connection reset".into()))
        }

        async fn list_sections(&self, _: u32) -> ApiResult<Vec<Section>> {
            Err(ApiError::Transport("connection reset".into()))
        }
    }

    struct Fixture {
        state: Arc<AppState>,
        board: u32,
        todo: u32,
        done: u32,
        a: u32,
        c: u32,
    }

    /// Board with "To Do" = [A(0), C(1)] and an empty "Done"
    async fn fixture() -> Fixture {
        let state = Arc::new(AppState::in_memory().unwrap());
        let board = backend::create_board(&state, OWNER, "Week".into(), BoardTemplate::Kanban).await.unwrap();
        let todo = backend::create_section(&state, OWNER, board.id, "To Do".into()).await.unwrap();
        let done = backend::create_section(&state, OWNER, board.id, "Done".into()).await.unwrap();
        let a = backend::create_task(&state, OWNER, Task::in_section(0, 0, "A".into(), board.id, Some(todo.id), 0))
            .await
            .unwrap();
        let c = backend::create_task(&state, OWNER, Task::in_section(0, 0, "C".into(), board.id, Some(todo.id), 0))
            .await
            .unwrap();
        backend::share_board(&state, OWNER, board.id, VIEWER, BoardAccess::Read).await.unwrap();
        Fixture {
            state,
            board: board.id,
            todo: todo.id,
            done: done.id,
            a: a.id,
            c: c.id,
        }
    }

    async fn resolver_for<A: TaskApi + 'static>(fx: &Fixture, api: Arc<A>) -> MoveResolver {
        let cache = Arc::new(BoardCache::new());
        let tasks = backend::list_tasks(&fx.state, OWNER, fx.board).await.unwrap();
        cache.seed_board(fx.board, tasks);
        MoveResolver::new(cache, api)
    }

    fn placement(tasks: &[Task]) -> Vec<(u32, Option<u32>, i32)> {
        tasks.iter().map(|t| (t.id, t.section_id, t.display_order)).collect()
    }

    #[tokio::test]
    async fn test_drop_on_empty_section_appends() {
        let fx = fixture().await;
        let resolver = resolver_for(&fx, Arc::new(LocalTaskApi::new(fx.state.clone(), OWNER))).await;

        let moved = resolver.resolve(fx.board, fx.a, DropTarget::Section(Some(fx.done))).await.unwrap().unwrap();
        assert_eq!(moved.section_id, Some(fx.done));
        assert_eq!(moved.display_order, 0);

        let cache = resolver.cache();
        assert_eq!(placement(&cache.tasks_in_section(fx.board, Some(fx.todo))), vec![(fx.c, Some(fx.todo), 1)]);
        assert_eq!(placement(&cache.tasks_in_section(fx.board, Some(fx.done))), vec![(fx.a, Some(fx.done), 0)]);
        assert!(!cache.has_pending(fx.board));
    }

    #[tokio::test]
    async fn test_drop_on_task_takes_its_place() {
        let fx = fixture().await;
        let resolver = resolver_for(&fx, Arc::new(LocalTaskApi::new(fx.state.clone(), OWNER))).await;

        let moved = resolver.resolve(fx.board, fx.c, DropTarget::Task(fx.a)).await.unwrap().unwrap();
        assert_eq!(moved.section_id, Some(fx.todo));
        assert_eq!(moved.display_order, 0);

        let column = resolver.cache().tasks_in_section(fx.board, Some(fx.todo));
        assert_eq!(column.iter().map(|t| t.id).collect::<Vec<_>>(), vec![fx.c, fx.a]);

        // the stored order agrees with what the cache renders
        let stored = backend::list_tasks(&fx.state, OWNER, fx.board).await.unwrap();
        assert_eq!(stored.iter().map(|t| t.id).collect::<Vec<_>>(), vec![fx.c, fx.a]);
    }

    #[tokio::test]
    async fn test_drop_on_own_column_area_moves_to_end() {
        let fx = fixture().await;
        let resolver = resolver_for(&fx, Arc::new(LocalTaskApi::new(fx.state.clone(), OWNER))).await;

        let moved = resolver.resolve(fx.board, fx.a, DropTarget::Section(Some(fx.todo))).await.unwrap().unwrap();
        assert_eq!(moved.display_order, 1);
        assert_eq!(
            placement(&resolver.cache().tasks_in_section(fx.board, Some(fx.todo))),
            vec![(fx.c, Some(fx.todo), 0), (fx.a, Some(fx.todo), 1)]
        );

        let stored = backend::list_tasks(&fx.state, OWNER, fx.board).await.unwrap();
        assert_eq!(stored.iter().map(|t| t.id).collect::<Vec<_>>(), vec![fx.c, fx.a]);
    }

    #[tokio::test]
    async fn test_trailing_drop_into_gapped_column_sends_nothing() {
        let fx = fixture().await;
        let api = Arc::new(CountingApi::new(LocalTaskApi::new(fx.state.clone(), OWNER)));
        let resolver = resolver_for(&fx, api.clone()).await;

        // To Do is left as [C(1)]
        resolver.resolve(fx.board, fx.a, DropTarget::Section(Some(fx.done))).await.unwrap();
        assert_eq!(resolver.resolve(fx.board, fx.c, DropTarget::Section(Some(fx.todo))).await, Ok(None));
        assert_eq!(api.moves(), 1);
    }

    #[tokio::test]
    async fn test_denied_move_restores_pre_drag_state() {
        let fx = fixture().await;
        let api = Arc::new(LocalTaskApi::new(fx.state.clone(), VIEWER));
        let resolver = resolver_for(&fx, api).await;
        let before = resolver.cache().get_tasks_for_board(fx.board);

        let err = resolver.resolve(fx.board, fx.a, DropTarget::Section(Some(fx.done))).await.unwrap_err();
        assert!(matches!(err, ApiError::PermissionDenied(_)));
        assert_eq!(resolver.cache().get_tasks_for_board(fx.board), before);
        assert!(!resolver.cache().has_pending(fx.board));
    }

    #[tokio::test]
    async fn test_no_op_drops_send_nothing() {
        let fx = fixture().await;
        let api = Arc::new(CountingApi::new(LocalTaskApi::new(fx.state.clone(), OWNER)));
        let resolver = resolver_for(&fx, api.clone()).await;

        // onto itself
        assert_eq!(resolver.resolve(fx.board, fx.a, DropTarget::Task(fx.a)).await, Ok(None));
        // C is already last in To Do
        assert_eq!(resolver.resolve(fx.board, fx.c, DropTarget::Section(Some(fx.todo))).await, Ok(None));
        // not on this board
        assert_eq!(resolver.resolve(fx.board, 999, DropTarget::Section(Some(fx.done))).await, Ok(None));
        assert_eq!(api.moves(), 0);

        resolver.resolve(fx.board, fx.a, DropTarget::Section(Some(fx.done))).await.unwrap();
        assert_eq!(api.moves(), 1);
    }

    #[tokio::test]
    async fn test_task_deleted_elsewhere_fails_and_rolls_back() {
        let fx = fixture().await;
        let resolver = resolver_for(&fx, Arc::new(LocalTaskApi::new(fx.state.clone(), OWNER))).await;
        let before = resolver.cache().get_tasks_for_board(fx.board);
        backend::delete_task(&fx.state, OWNER, fx.a).await.unwrap();

        let err = resolver.resolve(fx.board, fx.a, DropTarget::Section(Some(fx.done))).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(resolver.cache().get_tasks_for_board(fx.board), before);
    }

    #[tokio::test]
    async fn test_transport_failure_rolls_back() {
        let fx = fixture().await;
        let resolver = resolver_for(&fx, Arc::new(OfflineApi)).await;
        let before = resolver.cache().get_tasks_for_board(fx.board);

        let err = resolver.resolve(fx.board, fx.c, DropTarget::Task(fx.a)).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(resolver.cache().get_tasks_for_board(fx.board), before);
    }

    #[tokio::test]
    async fn test_plan_uses_count_excluding_dragged() {
        let fx = fixture().await;
        let resolver = resolver_for(&fx, Arc::new(OfflineApi)).await;

        let plan = resolver.plan(fx.board, fx.a, DropTarget::Section(Some(fx.todo))).unwrap();
        assert_eq!((plan.section_id, plan.display_order), (Some(fx.todo), 1));
        assert_eq!(plan.placement, Placement::Append);
        let plan = resolver.plan(fx.board, fx.a, DropTarget::Section(None)).unwrap();
        assert_eq!((plan.section_id, plan.display_order), (None, 0));
        let plan = resolver.plan(fx.board, fx.c, DropTarget::Task(fx.a)).unwrap();
        assert_eq!((plan.display_order, plan.placement), (0, Placement::MakeRoom));
        assert!(!resolver.cache().has_pending(fx.board));
    }
}

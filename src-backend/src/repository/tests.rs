//! Repository Integration Tests
//!
//! Tests for the board, section and task repositories with in-memory SQLite.

#[cfg(test)]
mod tests {
    use crate::domain::{
        Board, BoardAccess, BoardTemplate, DomainError, ItemData, RepeatRule, RepeatUnit, Section,
        SectionDeletion, Task, TaskStatus,
    };
    use crate::repository::{
        init_in_memory, BoardRepository, Repository, SectionRepository, TaskBoardOperations,
        TaskLifecycleOperations, TaskPositioningOperations, TaskRepository,
    };

    struct Fixture {
        boards: BoardRepository,
        sections: SectionRepository,
        tasks: TaskRepository,
    }

    fn setup_test_db() -> Fixture {
        let db = init_in_memory().expect("Failed to init test DB");
        Fixture {
            boards: BoardRepository::new(db.conn.clone()),
            sections: SectionRepository::new(db.conn.clone()),
            tasks: TaskRepository::new(db.conn),
        }
    }

    /// Board with "To Do" and "Done" columns owned by user 1
    async fn kanban(fx: &Fixture) -> (Board, Section, Section) {
        let board = fx
            .boards
            .create(&Board::new(0, 1, "Chores".to_string(), BoardTemplate::Kanban))
            .await
            .unwrap();
        let todo = fx.sections.create(&Section::new(0, board.id, "To Do".into(), 0)).await.unwrap();
        let done = fx.sections.create(&Section::new(0, board.id, "Done".into(), 1)).await.unwrap();
        (board, todo, done)
    }

    async fn add(fx: &Fixture, board: &Board, section: Option<u32>, title: &str) -> Task {
        fx.tasks
            .create(&Task::in_section(0, 1, title.to_string(), board.id, section, 0))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_appends_to_column() {
        let fx = setup_test_db();
        let (board, todo, _) = kanban(&fx).await;

        let a = add(&fx, &board, Some(todo.id), "A").await;
        let b = add(&fx, &board, Some(todo.id), "B").await;
        let loose = add(&fx, &board, None, "Loose").await;

        assert!(a.id > 0);
        assert_eq!(a.display_order, 0);
        assert_eq!(b.display_order, 1);
        assert_eq!(loose.display_order, 0);
        assert!(a.created_at > 0);
    }

    #[tokio::test]
    async fn test_create_rejects_mismatched_payload() {
        let fx = setup_test_db();
        let (board, _, _) = kanban(&fx).await;

        let mut task = Task::in_section(0, 1, "Eggs".into(), board.id, None, 0);
        task.item_data = ItemData::empty_for(BoardTemplate::Grocery);
        let err = fx.tasks.create(&task).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_foreign_section() {
        let fx = setup_test_db();
        let (board, _, _) = kanban(&fx).await;
        let (_, other_todo, _) = kanban(&fx).await;

        let task = Task::in_section(0, 1, "Misplaced".into(), board.id, Some(other_todo.id), 0);
        let err = fx.tasks.create(&task).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_payload_persistence() {
        let fx = setup_test_db();
        let board = fx
            .boards
            .create(&Board::new(0, 1, "Pantry".to_string(), BoardTemplate::Grocery))
            .await
            .unwrap();

        let mut task = Task::in_section(0, 1, "Milk".into(), board.id, None, 0);
        task.item_data = ItemData::Grocery { category: Some("dairy".into()), quantity: 2, unit: Some("l".into()) };
        task.tags = vec!["weekly".into()];
        let created = fx.tasks.create(&task).await.unwrap();

        let found = fx.tasks.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.item_data, task.item_data);
        assert_eq!(found.tags, vec!["weekly".to_string()]);
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_move_onto_task_takes_its_slot() {
        let fx = setup_test_db();
        let (board, todo, _) = kanban(&fx).await;
        let a = add(&fx, &board, Some(todo.id), "A").await;
        let c = add(&fx, &board, Some(todo.id), "C").await;

        let moved = fx.tasks.move_to(c.id, Some(todo.id), a.display_order).await.unwrap();
        assert_eq!(moved.display_order, 0);

        let column = fx.tasks.list_in_section(board.id, Some(todo.id)).await.unwrap();
        let titles: Vec<&str> = column.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "A"]);
        assert_eq!(column[1].display_order, 1);
    }

    #[tokio::test]
    async fn test_move_to_empty_section_leaves_source_alone() {
        let fx = setup_test_db();
        let (board, todo, done) = kanban(&fx).await;
        let a = add(&fx, &board, Some(todo.id), "A").await;
        let c = add(&fx, &board, Some(todo.id), "C").await;

        let moved = fx.tasks.move_to(a.id, Some(done.id), 0).await.unwrap();
        assert_eq!(moved.section_id, Some(done.id));
        assert_eq!(moved.display_order, 0);

        let left = fx.tasks.list_in_section(board.id, Some(todo.id)).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, c.id);
        assert_eq!(left[0].display_order, 1);
    }

    #[tokio::test]
    async fn test_move_errors() {
        let fx = setup_test_db();
        let (board, todo, _) = kanban(&fx).await;
        let (_, foreign, _) = kanban(&fx).await;
        let a = add(&fx, &board, Some(todo.id), "A").await;

        assert!(matches!(
            fx.tasks.move_to(9999, Some(todo.id), 0).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            fx.tasks.move_to(a.id, Some(foreign.id), 0).await,
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            fx.tasks.move_to(a.id, Some(todo.id), -1).await,
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_append_goes_after_every_open_task() {
        let fx = setup_test_db();
        let (board, todo, _) = kanban(&fx).await;
        let a = add(&fx, &board, Some(todo.id), "A").await;
        add(&fx, &board, Some(todo.id), "C").await;

        let appended = fx.tasks.append_to(a.id, Some(todo.id)).await.unwrap();
        assert_eq!(appended.display_order, 1);

        let column = fx.tasks.list_in_section(board.id, Some(todo.id)).await.unwrap();
        let titles: Vec<&str> = column.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "A"]);
        assert_eq!(column[0].display_order, 0);
    }

    #[tokio::test]
    async fn test_move_into_gapped_column_inserts_before_target() {
        let fx = setup_test_db();
        let (board, todo, done) = kanban(&fx).await;
        let a = add(&fx, &board, Some(todo.id), "A").await;
        let c = add(&fx, &board, Some(todo.id), "C").await;
        let b = add(&fx, &board, Some(done.id), "B").await;

        // To Do keeps C at 1 once A leaves
        fx.tasks.move_to(a.id, Some(done.id), 0).await.unwrap();
        let moved = fx.tasks.move_to(b.id, Some(todo.id), 1).await.unwrap();
        assert_eq!(moved.display_order, 0);

        let column = fx.tasks.list_in_section(board.id, Some(todo.id)).await.unwrap();
        assert_eq!(column.iter().map(|t| t.id).collect::<Vec<_>>(), vec![b.id, c.id]);
    }

    #[tokio::test]
    async fn test_archived_tasks_hold_no_position() {
        let fx = setup_test_db();
        let (board, todo, done) = kanban(&fx).await;
        let a = add(&fx, &board, Some(todo.id), "A").await;
        let x = add(&fx, &board, Some(todo.id), "X").await;
        let d = add(&fx, &board, Some(done.id), "D").await;
        fx.tasks.archive(x.id).await.unwrap();

        assert_eq!(fx.tasks.get_next_position(Some(board.id), Some(todo.id)).await.unwrap(), 1);
        let appended = fx.tasks.append_to(d.id, Some(todo.id)).await.unwrap();
        assert_eq!(appended.display_order, 1);

        let moved = fx.tasks.move_to(d.id, Some(todo.id), 0).await.unwrap();
        assert_eq!(moved.display_order, 0);
        assert_eq!(fx.tasks.find_by_id(a.id).await.unwrap().unwrap().display_order, 1);
        let archived = fx.tasks.find_by_id(x.id).await.unwrap().unwrap();
        assert_eq!(archived.status, TaskStatus::Archived);
        assert_eq!(archived.display_order, 1);
    }

    #[tokio::test]
    async fn test_reindex_section() {
        let fx = setup_test_db();
        let (board, todo, _) = kanban(&fx).await;
        let a = add(&fx, &board, Some(todo.id), "A").await;
        let b = add(&fx, &board, Some(todo.id), "B").await;
        fx.tasks.delete(a.id).await.unwrap();

        fx.tasks.reindex_section(Some(board.id), Some(todo.id)).await.unwrap();
        let found = fx.tasks.find_by_id(b.id).await.unwrap().unwrap();
        assert_eq!(found.display_order, 0);
        assert_eq!(fx.tasks.get_next_position(Some(board.id), Some(todo.id)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_status_lifecycle() {
        let fx = setup_test_db();
        let (board, todo, _) = kanban(&fx).await;
        let a = add(&fx, &board, Some(todo.id), "A").await;

        let done = fx.tasks.set_status(a.id, TaskStatus::Done).await.unwrap();
        assert!(done.completed_at.is_some());
        let reopened = fx.tasks.set_status(a.id, TaskStatus::Todo).await.unwrap();
        assert!(reopened.completed_at.is_none());

        let archived = fx.tasks.archive(a.id).await.unwrap();
        assert_eq!(archived.status, TaskStatus::Archived);
        assert!(fx.tasks.list_by_board(board.id).await.unwrap().is_empty());
        assert!(fx.tasks.find_by_id(a.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_complete_repeating_task() {
        let fx = setup_test_db();
        let (board, todo, _) = kanban(&fx).await;
        let mut task = Task::in_section(0, 1, "Laundry".into(), board.id, Some(todo.id), 0);
        task.repeat = Some(RepeatRule { every: 2, unit: RepeatUnit::Day });
        task.due_date = chrono::NaiveDate::from_ymd_opt(2026, 5, 1);
        let created = fx.tasks.create(&task).await.unwrap();

        let completed = fx.tasks.complete(created.id).await.unwrap();
        assert_eq!(completed.status, TaskStatus::Todo);
        assert_eq!(completed.due_date, chrono::NaiveDate::from_ymd_opt(2026, 5, 3));
        assert!(completed.last_completed_at.is_some());
        let stored = fx.tasks.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored, completed);
    }

    #[tokio::test]
    async fn test_update_keeps_position_and_completed_at_rule() {
        let fx = setup_test_db();
        let (board, todo, done) = kanban(&fx).await;
        let a = add(&fx, &board, Some(todo.id), "A").await;

        let mut edit = a.clone();
        edit.title = "A, renamed".into();
        edit.section_id = Some(done.id);
        edit.status = TaskStatus::Done;
        let updated = fx.tasks.update(&edit).await.unwrap();

        assert_eq!(updated.title, "A, renamed");
        assert_eq!(updated.section_id, Some(todo.id));
        assert!(updated.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_delete_section_unsections_tasks() {
        let fx = setup_test_db();
        let (board, todo, _) = kanban(&fx).await;
        let a = add(&fx, &board, Some(todo.id), "A").await;

        let affected = fx.sections.delete_with(todo.id, SectionDeletion::Unsection).await.unwrap();
        assert_eq!(affected, 1);
        let found = fx.tasks.find_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(found.section_id, None);
        assert_eq!(found.board_id, Some(board.id));
    }

    #[tokio::test]
    async fn test_delete_section_cascade() {
        let fx = setup_test_db();
        let (board, todo, done) = kanban(&fx).await;
        let a = add(&fx, &board, Some(todo.id), "A").await;

        fx.sections.delete_with(todo.id, SectionDeletion::Cascade).await.unwrap();
        assert!(fx.tasks.find_by_id(a.id).await.unwrap().is_none());
        let remaining = fx.sections.list_by_board(board.id).await.unwrap();
        assert_eq!(remaining, vec![done]);

        assert!(matches!(
            fx.sections.delete_with(todo.id, SectionDeletion::Cascade).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_sharing_and_access() {
        let fx = setup_test_db();
        let (board, _, _) = kanban(&fx).await;

        assert_eq!(fx.boards.access_for(board.id, 1).await.unwrap(), Some(BoardAccess::Owner));
        assert_eq!(fx.boards.access_for(board.id, 2).await.unwrap(), None);

        fx.boards.share(board.id, 2, BoardAccess::Read).await.unwrap();
        assert_eq!(fx.boards.access_for(board.id, 2).await.unwrap(), Some(BoardAccess::Read));

        fx.boards.share(board.id, 2, BoardAccess::ReadWrite).await.unwrap();
        assert_eq!(fx.boards.access_for(board.id, 2).await.unwrap(), Some(BoardAccess::ReadWrite));
        assert_eq!(fx.boards.list_for_user(2).await.unwrap().len(), 1);

        assert!(matches!(fx.boards.share(board.id, 1, BoardAccess::Read).await, Err(DomainError::Conflict(_))));

        fx.boards.unshare(board.id, 2).await.unwrap();
        assert!(fx.boards.list_for_user(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_inbox_listing() {
        let fx = setup_test_db();
        fx.tasks.create(&Task::new(0, 1, "Call mom".into())).await.unwrap();
        fx.tasks.create(&Task::new(0, 2, "Someone else".into())).await.unwrap();

        let inbox = fx.tasks.list_inbox(1).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].title, "Call mom");
    }
}

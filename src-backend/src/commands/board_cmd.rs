//! Board and Section Commands
//!
//! Board creation, sharing and column management with access checks.

use crate::domain::{Board, BoardAccess, BoardTemplate, DomainError, DomainResult, Section, SectionDeletion};
use crate::repository::Repository;
use crate::AppState;

/// Fail unless the user can see the board
pub(super) async fn require_read(state: &AppState, user_id: u32, board_id: u32) -> DomainResult<BoardAccess> {
    state
        .boards
        .access_for(board_id, user_id)
        .await?
        .ok_or_else(|| DomainError::PermissionDenied(format!("User {} cannot view board {}", user_id, board_id)))
}

/// Fail unless the user owns the board or has read-write membership
pub(super) async fn require_write(state: &AppState, user_id: u32, board_id: u32) -> DomainResult<BoardAccess> {
    let access = require_read(state, user_id, board_id).await?;
    if !access.can_write() {
        tracing::warn!(user_id, board_id, "write rejected on read-only board");
        return Err(DomainError::PermissionDenied(format!(
            "User {} has read-only access to board {}",
            user_id, board_id
        )));
    }
    Ok(access)
}

pub async fn create_board(
    state: &AppState,
    user_id: u32,
    name: String,
    template: BoardTemplate,
) -> DomainResult<Board> {
    let board = state.boards.create(&Board::new(0, user_id, name, template)).await?;
    tracing::info!(board_id = board.id, template = board.template.as_str(), "board created");
    Ok(board)
}

pub async fn list_boards(state: &AppState, user_id: u32) -> DomainResult<Vec<Board>> {
    state.boards.list_for_user(user_id).await
}

/// Only the owner may share
pub async fn share_board(
    state: &AppState,
    user_id: u32,
    board_id: u32,
    member_id: u32,
    access: BoardAccess,
) -> DomainResult<()> {
    if require_read(state, user_id, board_id).await? != BoardAccess::Owner {
        return Err(DomainError::PermissionDenied(format!("Only the owner can share board {}", board_id)));
    }
    state.boards.share(board_id, member_id, access).await
}

pub async fn delete_board(state: &AppState, user_id: u32, board_id: u32) -> DomainResult<()> {
    if require_read(state, user_id, board_id).await? != BoardAccess::Owner {
        return Err(DomainError::PermissionDenied(format!("Only the owner can delete board {}", board_id)));
    }
    state.boards.delete(board_id).await
}

pub async fn create_section(state: &AppState, user_id: u32, board_id: u32, name: String) -> DomainResult<Section> {
    require_write(state, user_id, board_id).await?;
    let next = state
        .sections
        .list_by_board(board_id)
        .await?
        .iter()
        .map(|s| s.display_order + 1)
        .max()
        .unwrap_or(0);
    state.sections.create(&Section::new(0, board_id, name, next)).await
}

pub async fn list_sections(state: &AppState, user_id: u32, board_id: u32) -> DomainResult<Vec<Section>> {
    require_read(state, user_id, board_id).await?;
    state.sections.list_by_board(board_id).await
}

/// Delete a column. `cascade` must come from an explicit user confirmation.
pub async fn delete_section(state: &AppState, user_id: u32, section_id: u32, cascade: bool) -> DomainResult<usize> {
    let section = state
        .sections
        .find_by_id(section_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Section {} not found", section_id)))?;
    require_write(state, user_id, section.board_id).await?;
    let mode = if cascade { SectionDeletion::Cascade } else { SectionDeletion::Unsection };
    state.sections.delete_with(section_id, mode).await
}

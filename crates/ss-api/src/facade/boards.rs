//! Moodboards. Every operation talks to the backend directly; there is no
//! local or demo fallback for boards. Private boards are visible to their
//! owner only, and placements can only be changed through a board the
//! caller owns.

use super::{require, StyleSync};
use serde::de::DeserializeOwned;
use serde_json::json;
use ss_core::error::{AppError, Result};
use ss_core::models::{Board, BoardDetail, BoardItem, BoardUpdate, Item, NewBoard, PlacedItem, Position};
use ss_core::query::{Filter, Join, Query, Table};
use std::collections::HashMap;

pub struct BoardsApi<'a> {
    pub(super) app: &'a StyleSync,
}

impl BoardsApi<'_> {
    pub async fn list(&self, owner: &str) -> Result<Vec<Board>> {
        let query = Query::from(Table::Boards).eq("user_id", owner).order_desc("created_at");
        self.app.select_rows(&query).await
    }

    /// Public boards of every user, with the owner's name and avatar.
    pub async fn list_public(&self) -> Result<Vec<Board>> {
        let query = Query::from(Table::Boards)
            .eq("is_public", true)
            .order_desc("created_at")
            .join(Join::board_owner());
        self.app.select_rows(&query).await
    }

    async fn find<T: DeserializeOwned>(&self, query: Query, table: Table, id: &str) -> Result<T> {
        self.app
            .select_rows(&query.limit(1))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found(table.entity(), id))
    }

    async fn owned_board(&self, owner: &str, board_id: &str) -> Result<Board> {
        let query = Query::from(Table::Boards).eq("id", board_id).eq("user_id", owner);
        self.find(query, Table::Boards, board_id).await
    }

    /// A placement on one of `owner`'s boards.
    async fn owned_placement(&self, owner: &str, placement_id: &str) -> Result<BoardItem> {
        let placement: BoardItem = self
            .find(Query::from(Table::BoardItems).eq("id", placement_id), Table::BoardItems, placement_id)
            .await?;
        match self.owned_board(owner, &placement.board_id).await {
            Ok(_) => Ok(placement),
            Err(AppError::NotFound(..)) => Err(AppError::not_found(Table::BoardItems.entity(), placement_id)),
            Err(e) => Err(e),
        }
    }

    /// A board with its placements, as seen by `viewer` (`None` when
    /// anonymous). Another user's private board reads as not found.
    /// Placements whose item has been deleted are left out.
    pub async fn get(&self, viewer: Option<&str>, id: &str) -> Result<BoardDetail> {
        let board: Board = self.find(Query::from(Table::Boards).eq("id", id), Table::Boards, id).await?;
        if !board.is_public && viewer != Some(board.user_id.as_str()) {
            return Err(AppError::not_found(Table::Boards.entity(), id));
        }

        let placements: Vec<BoardItem> = self
            .app
            .select_rows(&Query::from(Table::BoardItems).eq("board_id", id).order_asc("created_at"))
            .await?;
        if placements.is_empty() {
            return Ok(BoardDetail { board, items: Vec::new() });
        }

        let item_ids: Vec<&str> = placements.iter().map(|p| p.item_id.as_str()).collect();
        let items: Vec<Item> = self
            .app
            .select_rows(&Query::from(Table::Items).is_in("id", item_ids).join(Join::item_category()))
            .await?;
        let by_id: HashMap<String, Item> = items.into_iter().map(|i| (i.id.clone(), i)).collect();

        let items = placements
            .into_iter()
            .filter_map(|placement| {
                let item = by_id.get(&placement.item_id).cloned()?;
                Some(PlacedItem { placement, item })
            })
            .collect();
        Ok(BoardDetail { board, items })
    }

    pub async fn create(&self, owner: &str, draft: NewBoard) -> Result<Board> {
        require("name", &draft.name)?;
        let mut row = serde_json::to_value(&draft)?;
        if let Some(obj) = row.as_object_mut() {
            obj.insert("user_id".into(), json!(owner));
        }
        self.app.insert_row(Table::Boards, row, &[]).await
    }

    pub async fn update(&self, owner: &str, id: &str, patch: BoardUpdate) -> Result<Board> {
        self.app.update_row(Table::Boards, id, &[Filter::owned_by(owner)], &patch, &[]).await
    }

    pub async fn delete(&self, owner: &str, id: &str) -> Result<()> {
        self.app.delete_row(Table::Boards, id, &[Filter::owned_by(owner)]).await
    }

    /// Places one of `owner`'s items on one of their boards.
    pub async fn add_item(&self, owner: &str, board_id: &str, item_id: &str, position: Position) -> Result<BoardItem> {
        self.owned_board(owner, board_id).await?;
        let item = Query::from(Table::Items).eq("id", item_id).eq("user_id", owner);
        self.find::<Item>(item, Table::Items, item_id).await?;

        let row = json!({
            "board_id": board_id,
            "item_id": item_id,
            "position_x": position.x,
            "position_y": position.y,
        });
        self.app.insert_row(Table::BoardItems, row, &[]).await
    }

    pub async fn move_item(&self, owner: &str, placement_id: &str, position: Position) -> Result<BoardItem> {
        self.owned_placement(owner, placement_id).await?;
        let patch = json!({ "position_x": position.x, "position_y": position.y });
        self.app.update_row(Table::BoardItems, placement_id, &[], &patch, &[]).await
    }

    pub async fn remove_item(&self, owner: &str, placement_id: &str) -> Result<()> {
        self.owned_placement(owner, placement_id).await?;
        self.app.delete_row(Table::BoardItems, placement_id, &[]).await
    }
}

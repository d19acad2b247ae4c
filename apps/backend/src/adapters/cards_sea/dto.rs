//! DTOs for the cards_sea adapter.

/// DTO for creating a new card.
#[derive(Debug, Clone)]
pub struct CardCreate {
    pub user_id: i64,
    pub year: i32,
    pub title: Option<String>,
    pub category: Option<String>,
    pub grid_size: i16,
    pub header_text: String,
    pub free_space_pos: Option<i16>,
    pub is_finalized: bool,
    pub visible_to_friends: bool,
}

impl CardCreate {
    pub fn new(user_id: i64, year: i32, grid_size: i16, header_text: impl Into<String>) -> Self {
        Self {
            user_id,
            year,
            title: None,
            category: None,
            grid_size,
            header_text: header_text.into(),
            free_space_pos: None,
            is_finalized: false,
            visible_to_friends: false,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    /// `Some(pos)` enables the free space at `pos`; `None` disables it.
    pub fn with_free_space_pos(mut self, pos: Option<i16>) -> Self {
        self.free_space_pos = pos;
        self
    }

    pub fn finalized(mut self, finalized: bool) -> Self {
        self.is_finalized = finalized;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible_to_friends = visible;
        self
    }
}

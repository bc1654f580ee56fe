use serde::{Deserialize, Serialize};

/// Pointer to the title a user last opened in the player.
///
/// One record per user, overwritten on every save.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastWatched {
    pub movie_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        rename = "poster_path",
        alias = "posterPath",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub poster_path: Option<String>,
}

impl LastWatched {
    /// Merge-write: fields present in `update` replace ours, absent ones are kept
    pub fn merge(self, update: LastWatched) -> LastWatched {
        LastWatched {
            movie_id: if update.movie_id.is_empty() {
                self.movie_id
            } else {
                update.movie_id
            },
            title: update.title.or(self.title),
            poster_path: update.poster_path.or(self.poster_path),
        }
    }
}

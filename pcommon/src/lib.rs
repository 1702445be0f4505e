//! Shared utilities and strongly-typed common values for workspace crates.
//!
//! ```rust
//! use pcommon::{ChannelId, UserId};
//!
//! let channel = ChannelId::from("general");
//! let author = UserId::new("1234");
//! assert_eq!(channel.as_str(), "general");
//! assert_eq!(author.to_string(), "1234");
//! assert_eq!(author.mention(), "<@1234>");
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use pcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Identifier newtypes shared between the gateway, dispatcher, and binary.

    use std::fmt::{Display, Formatter};

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct ChannelId(String);

    impl ChannelId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for ChannelId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for ChannelId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for ChannelId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct UserId(String);

    impl UserId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }

        /// The inline token a chat client renders as an @-mention of this user.
        pub fn mention(&self) -> String {
            format!("<@{}>", self.0)
        }
    }

    impl Display for UserId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for UserId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for UserId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub use context::{ChannelId, UserId};
pub use future::BoxFuture;

#[cfg(test)]
mod tests {
    use super::{ChannelId, UserId};

    #[test]
    fn id_newtypes_round_trip_strings() {
        let channel = ChannelId::new("channel-1");
        let user = UserId::from("user-1");

        assert_eq!(channel.as_str(), "channel-1");
        assert_eq!(user.as_str(), "user-1");
        assert_eq!(channel.to_string(), "channel-1");
        assert_eq!(user.to_string(), "user-1");
    }

    #[test]
    fn user_mention_uses_angle_bracket_token() {
        assert_eq!(UserId::new("42").mention(), "<@42>");
    }
}

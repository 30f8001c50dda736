pub(crate) use {
    std::{
        collections::HashMap,
        fmt,
        sync::Arc,
        time::Duration,
    },
    chrono::prelude::*,
    serde::{
        Deserialize,
        Serialize,
    },
    crate::{
        cache::Cache,
        config::Config,
        tournament::{
            Listing,
            RawTournament,
            Status,
            Tournament,
        },
    },
};

pub const PAGE_SIZE: usize = 25;

pub const VIEW_TARGET_PERMISSION: &str = "tom_targets.view_target";

pub const JWT_COOKIE_NAME: &str = "jwt";

pub const JWT_LIFETIME_SECS: u64 = 24 * 60 * 60;

pub const DEFAULT_DB_PATH: &str = "./db/targetview.redb";

pub const DEFAULT_DASHBOARD_APP: &str = "TargetlistTable";

pub const DEFAULT_TARGETLIST_COLUMNS: &str =
    "name:text,type:text,ra:numeric,dec:numeric,created:datetime";

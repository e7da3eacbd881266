//! Application-wide constants: routes, endpoints, storage keys, messages

pub mod routes {
    pub const HOME: &str = "/";
    pub const LOGIN: &str = "/login";
    pub const DASHBOARD: &str = "/dashboard";
    pub const PROFILE: &str = "/profile";
    pub const SETTINGS: &str = "/settings";

    /// Route table metadata
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RouteMeta {
        pub path: &'static str,
        /// i18n key of the page title
        pub title: &'static str,
        pub requires_auth: bool,
        pub hidden: bool,
    }

    pub const TABLE: &[RouteMeta] = &[
        RouteMeta {
            path: HOME,
            title: "nav.home",
            requires_auth: false,
            hidden: false,
        },
        RouteMeta {
            path: LOGIN,
            title: "nav.login",
            requires_auth: false,
            hidden: true,
        },
        RouteMeta {
            path: DASHBOARD,
            title: "nav.dashboard",
            requires_auth: true,
            hidden: false,
        },
        RouteMeta {
            path: PROFILE,
            title: "nav.profile",
            requires_auth: true,
            hidden: false,
        },
        RouteMeta {
            path: SETTINGS,
            title: "nav.settings",
            requires_auth: true,
            hidden: false,
        },
    ];

    pub fn find(path: &str) -> Option<&'static RouteMeta> {
        TABLE.iter().find(|route| route.path == path)
    }

    /// Where navigation to `path` ends up for the given auth state.
    ///
    /// Protected routes send anonymous users to the login page, and unknown
    /// paths fall back to home.
    pub fn resolve(path: &str, is_authenticated: bool) -> &'static str {
        match find(path) {
            Some(route) if route.requires_auth && !is_authenticated => LOGIN,
            Some(route) => route.path,
            None => HOME,
        }
    }
}

pub mod api_endpoints {
    pub mod auth {
        pub const LOGIN: &str = "/auth/login";
        pub const LOGOUT: &str = "/auth/logout";
        pub const REFRESH: &str = "/auth/refresh";
        pub const PROFILE: &str = "/auth/profile";
    }

    pub mod users {
        pub const LIST: &str = "/users";
        pub const CREATE: &str = "/users";

        pub fn update(id: &str) -> String {
            format!("/users/{}", urlencoding::encode(id))
        }

        pub fn delete(id: &str) -> String {
            format!("/users/{}", urlencoding::encode(id))
        }
    }
}

pub mod storage_keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const USER_PREFERENCES: &str = "user_preferences";
    pub const THEME: &str = "theme";
    pub const LANGUAGE: &str = "language";
}

pub mod languages {
    pub const ZH: &str = "zh";
    pub const EN: &str = "en";

    pub const SUPPORTED: &[&str] = &[ZH, EN];

    pub fn is_supported(language: &str) -> bool {
        SUPPORTED.contains(&language)
    }
}

pub mod validation_messages {
    pub const REQUIRED: &str = "此字段为必填项";
    pub const EMAIL_INVALID: &str = "请输入有效的电子邮件地址";
    pub const PASSWORD_MIN_LENGTH: &str = "密码必须至少包含6个字符";
    pub const PASSWORD_CONFIRM_MISMATCH: &str = "两次输入的密码不一致";
}

pub mod app_config {
    pub const NAME: &str = "项目模版";
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const DESCRIPTION: &str = "基于 Rust 的应用客户端模版";
    pub const AUTHOR: &str = "开发团队";
    pub const CONTACT_EMAIL: &str = "support@example.com";
}

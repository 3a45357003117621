//! CLI commands
//!
//! Each command opens the console page it corresponds to. The page's guard
//! runs against the resolved session before any API call, so the CLI enforces
//! the same access rules as a browser would.

use anyhow::{Context, Result, anyhow, bail};
use bop_core::routes::login_redirect;
use bop_core::{
    AccessTier, Currency, CurrencyAssignment, CurrencyUpdate, FileCredentialStore, GuardOutcome,
    MemoryNavigator, NavigationEvent, Navigator, NewUser, Route, UserUpdate,
};
use bop_frontend_common::{
    ActionError, CurrenciesController, RolesController, SessionStore, UsersController,
    auth_guard, menu_for,
};
use bop_http::ApiClient;
use clap::Subcommand;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ClientSettings;

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with email and password
    Login {
        email: String,

        /// Account password
        #[arg(long, env = "BOP_PASSWORD", hide_env_values = true)]
        password: String,

        /// Console page to land on afterwards
        #[arg(long)]
        redirect: Option<String>,
    },

    /// Start Google sign-in and print the URL to open
    LoginGoogle {
        /// Console page to land on afterwards
        #[arg(long)]
        redirect: Option<String>,
    },

    /// Finish Google sign-in with the callback URL the browser ended on
    OauthCallback {
        /// Full callback URL, or just its query string
        url: String,
    },

    /// Forget the stored credentials
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Show the navigation menu for the logged-in user
    Menu,

    /// Manage users (administrators only)
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage roles (administrators only)
    Roles {
        #[command(subcommand)]
        command: RoleCommands,
    },

    /// Manage currencies
    Currencies {
        #[command(subcommand)]
        command: CurrencyCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    List,
    Show {
        id: i64,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "BOP_NEW_USER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        role_id: Option<i64>,
        /// Preferred currency
        #[arg(long)]
        currency: Option<String>,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// New password; blank keeps the current one
        #[arg(long)]
        password: Option<String>,
        #[arg(long, conflicts_with = "clear_role")]
        role_id: Option<i64>,
        /// Remove the user's role
        #[arg(long)]
        clear_role: bool,
        /// Replace the assigned currencies (repeatable)
        #[arg(long = "currency")]
        currencies: Vec<String>,
        /// Default among the assigned currencies
        #[arg(long, requires = "currencies")]
        default_currency: Option<String>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum RoleCommands {
    List,
    Create { name: String },
    Rename { id: i64, name: String },
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum CurrencyCommands {
    /// Every currency (administrators only)
    List,
    Show {
        code: String,
    },
    Create {
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        inactive: bool,
    },
    Update {
        code: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    Delete {
        code: String,
    },
    /// Currencies assigned to me
    Mine,
    /// Change my default currency
    SetDefault {
        code: String,
    },
    /// Currencies assigned to a user (administrators only)
    OfUser {
        user_id: i64,
    },
    /// Assign a currency to a user (administrators only)
    Assign {
        user_id: i64,
        code: String,
    },
}

/// Session store and navigator shared by one command run
struct Console {
    store: SessionStore,
    navigator: Arc<MemoryNavigator>,
    json: bool,
}

impl Console {
    fn open(settings: &ClientSettings, json: bool) -> Result<Self> {
        let credentials = FileCredentialStore::open(settings.credentials_path())
            .context("Failed to open credential store")?;
        let navigator = Arc::new(MemoryNavigator::default());
        let client = ApiClient::builder()
            .base_url(settings.api_url())
            .timeout(settings.timeout())
            .credentials(Arc::new(credentials))
            .navigator(navigator.clone())
            .build()?;
        debug!(base_url = %client.base_url(), "API client ready");

        Ok(Self {
            store: SessionStore::new(client),
            navigator,
            json,
        })
    }

    /// Open `route`, resolving the session first; fails unless the guard
    /// lets the page render
    async fn enter(&self, route: &Route) -> Result<()> {
        let path = route.path();
        self.navigator.set_current(&path);
        self.store.resolve().await;

        match auth_guard::enter(&self.store, &path) {
            GuardOutcome::Render => Ok(()),
            GuardOutcome::Redirect(target) if target.starts_with(Route::LOGIN_PATH) => {
                bail!("Not logged in. Run `bop login` first.")
            }
            GuardOutcome::Redirect(_) => {
                bail!("{path} requires an administrator account")
            }
            GuardOutcome::Loading => Err(anyhow!("Session could not be resolved")),
        }
    }

    fn client(&self) -> ApiClient {
        self.store.client().clone()
    }

    fn print<T: Serialize>(&self, value: &T, line: impl FnOnce(&T) -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", line(value));
        }
        Ok(())
    }

    fn print_list<T: Serialize>(&self, items: &[T], line: impl Fn(&T) -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(items)?);
        } else if items.is_empty() {
            println!("(none)");
        } else {
            for item in items {
                println!("{}", line(item));
            }
        }
        Ok(())
    }
}

fn action(err: ActionError) -> anyhow::Error {
    anyhow!(err.to_string())
}

fn login_page(redirect: Option<&str>) -> String {
    redirect.map_or_else(|| Route::LOGIN_PATH.to_string(), login_redirect)
}

impl Commands {
    pub async fn execute(self, settings: &ClientSettings, json: bool) -> Result<()> {
        let console = Console::open(settings, json)?;

        match self {
            Self::Login {
                email,
                password,
                redirect,
            } => login(&console, &email, &password, redirect.as_deref()).await,
            Self::LoginGoogle { redirect } => login_google(&console, redirect.as_deref()).await,
            Self::OauthCallback { url } => oauth_callback(&console, &url).await,
            Self::Logout => {
                console.store.logout();
                println!("Logged out");
                Ok(())
            }
            Self::Whoami => whoami(&console).await,
            Self::Menu => {
                console.enter(&Route::Dashboard).await?;
                for entry in menu_for(console.store.snapshot().capability()) {
                    println!("{:<12} {}", entry.label, entry.path());
                }
                Ok(())
            }
            Self::Users { command } => command.execute(&console).await,
            Self::Roles { command } => command.execute(&console).await,
            Self::Currencies { command } => command.execute(&console).await,
        }
    }
}

async fn login(
    console: &Console,
    email: &str,
    password: &str,
    redirect: Option<&str>,
) -> Result<()> {
    console.navigator.set_current(login_page(redirect));
    console.store.resolve().await;

    let session = console.store.login(email, password).await;
    if !session.is_authenticated() {
        bail!(
            "{}",
            session
                .last_error()
                .unwrap_or(bop_frontend_common::LOGIN_FAILED)
        );
    }

    if let Some(identity) = session.identity() {
        info!(user_id = identity.id, "Logged in");
        println!(
            "Logged in as {} <{}> ({})",
            identity.display_name,
            identity.email,
            identity.capability()
        );
    }
    println!("Landing page: {}", console.navigator.current_path());
    Ok(())
}

async fn login_google(console: &Console, redirect: Option<&str>) -> Result<()> {
    console.navigator.set_current(login_page(redirect));
    console.store.resolve().await;
    console.store.login_with_google();

    match console.navigator.last_event() {
        Some(NavigationEvent::HardRedirect(url)) => {
            println!("Open this URL in a browser to sign in with Google:");
            println!("{url}");
            println!("Then run `bop oauth-callback <callback URL>`.");
            Ok(())
        }
        _ => Err(anyhow!("Google sign-in did not start")),
    }
}

async fn oauth_callback(console: &Console, url: &str) -> Result<()> {
    console.navigator.set_current(Route::GoogleCallback.path());
    console.store.resolve().await;

    let identity = console
        .store
        .complete_google_callback(url)
        .await
        .map_err(|err| anyhow!(err.to_string()))?;
    println!(
        "Logged in as {} <{}> ({})",
        identity.display_name,
        identity.email,
        identity.capability()
    );
    println!("Landing page: {}", console.navigator.current_path());
    Ok(())
}

async fn whoami(console: &Console) -> Result<()> {
    console.enter(&Route::Dashboard).await?;
    let session = console
        .store
        .refresh_identity()
        .await
        .map_err(|err| anyhow!(bop_frontend_common::auth::error_messages::user_message(
            &err,
            "Failed to fetch profile"
        )))?;

    let identity = session
        .identity()
        .ok_or_else(|| anyhow!("Not logged in. Run `bop login` first."))?;
    println!("{} <{}>", identity.display_name, identity.email);
    println!(
        "role: {}",
        identity.role.as_ref().map_or("-", |r| r.name.as_str())
    );
    println!("capability: {}", identity.capability());
    if let Some(currency) = &identity.currency_preference {
        println!("currency: {currency}");
    }
    Ok(())
}

impl UserCommands {
    fn route(&self) -> Route {
        match self {
            Self::List | Self::Delete { .. } => Route::Users,
            Self::Show { id } => Route::UserDetail(*id),
            Self::Create { .. } => Route::UserCreate,
            Self::Update { id, .. } => Route::UserEdit(*id),
        }
    }

    async fn execute(self, console: &Console) -> Result<()> {
        console.enter(&self.route()).await?;
        let mut users = UsersController::new(console.client());

        match self {
            Self::List => {
                let state = users.refetch().await;
                if let Some(error) = &state.error {
                    bail!("{error}");
                }
                console.print_list(&state.items, |u| {
                    format!(
                        "{:>5}  {:<24} {:<32} {}",
                        u.id,
                        u.name,
                        u.email,
                        u.role.as_ref().map_or("-", |r| r.name.as_str())
                    )
                })?;
                if let Some(page) = users.pagination() {
                    if !console.json {
                        println!(
                            "page {}/{} ({} users)",
                            page.page, page.total_pages, page.total_items
                        );
                    }
                }
                Ok(())
            }
            Self::Show { id } => {
                let context = users.load_edit_context(id).await.map_err(action)?;
                let default_currency = context.default_currency().map(str::to_string);
                console.print(&context.user, |u| {
                    let currencies: Vec<&str> = context
                        .assigned
                        .iter()
                        .map(|a| a.currency_code.as_str())
                        .collect();
                    format!(
                        "{} <{}>\nrole: {}\nactive: {}\ncurrencies: {}\ndefault currency: {}",
                        u.name,
                        u.email,
                        u.role.as_ref().map_or("-", |r| r.name.as_str()),
                        u.is_active,
                        currencies.join(", "),
                        default_currency.as_deref().unwrap_or("-")
                    )
                })
            }
            Self::Create {
                name,
                email,
                password,
                role_id,
                currency,
            } => {
                let mut user = NewUser::new(name, email, password);
                user.role_id = role_id;
                if let Some(currency) = currency {
                    user.currency_context = currency.to_ascii_uppercase();
                }
                let created = users.create(&user).await.map_err(action)?;
                println!("Created user {} ({})", created.id, created.email);
                Ok(())
            }
            Self::Update {
                id,
                name,
                email,
                password,
                role_id,
                clear_role,
                currencies,
                default_currency,
            } => {
                let role_id = if clear_role {
                    Some(None)
                } else {
                    role_id.map(Some)
                };
                let update = UserUpdate {
                    name,
                    email,
                    password,
                    role_id,
                    ..UserUpdate::default()
                };
                let assignment = (!currencies.is_empty()).then(|| {
                    let codes: Vec<String> =
                        currencies.iter().map(|c| c.to_ascii_uppercase()).collect();
                    let default_currency = default_currency
                        .map(|c| c.to_ascii_uppercase())
                        .or_else(|| codes.first().cloned())
                        .unwrap_or_default();
                    CurrencyAssignment {
                        currency_codes: codes,
                        default_currency,
                    }
                });
                let updated = users.update(id, update, assignment).await.map_err(action)?;
                println!("Updated user {} ({})", updated.id, updated.email);
                Ok(())
            }
            Self::Delete { id } => {
                users.delete(id).await.map_err(action)?;
                println!("Deleted user {id}");
                Ok(())
            }
        }
    }
}

impl RoleCommands {
    async fn execute(self, console: &Console) -> Result<()> {
        console.enter(&Route::Roles).await?;
        let mut roles = RolesController::new(console.client());

        match self {
            Self::List => {
                let state = roles.refetch().await;
                if let Some(error) = &state.error {
                    bail!("{error}");
                }
                console.print_list(&state.items, |r| format!("{:>5}  {}", r.id, r.name))
            }
            Self::Create { name } => {
                let role = roles.create(&name).await.map_err(action)?;
                println!("Created role {} ({})", role.name, role.id);
                Ok(())
            }
            Self::Rename { id, name } => {
                let role = roles.rename(id, &name).await.map_err(action)?;
                println!("Renamed role {} to {}", role.id, role.name);
                Ok(())
            }
            Self::Delete { id } => {
                let state = roles.refetch().await;
                if let Some(error) = &state.error {
                    bail!("{error}");
                }
                let role = roles
                    .roles()
                    .iter()
                    .find(|r| r.id == id)
                    .cloned()
                    .ok_or_else(|| anyhow!("No role with id {id}"))?;
                roles.delete(&role).await.map_err(action)?;
                println!("Deleted role {}", role.name);
                Ok(())
            }
        }
    }
}

impl CurrencyCommands {
    fn route(&self) -> Route {
        match self {
            Self::List
            | Self::Show { .. }
            | Self::Delete { .. }
            | Self::OfUser { .. }
            | Self::Assign { .. } => Route::Currencies,
            Self::Create { .. } => Route::CurrencyCreate,
            Self::Update { code, .. } => Route::CurrencyEdit(code.to_ascii_uppercase()),
            Self::Mine | Self::SetDefault { .. } => Route::Dashboard,
        }
    }

    async fn execute(self, console: &Console) -> Result<()> {
        let route = self.route();
        console.enter(&route).await?;
        debug!(admin = route.tier() == AccessTier::AdminOnly, "Currency command");
        let mut currencies = CurrenciesController::new(console.client());

        match self {
            Self::List => {
                let state = currencies.refetch().await;
                if let Some(error) = &state.error {
                    bail!("{error}");
                }
                console.print_list(&state.items, |c| {
                    format!(
                        "{:<5} {:<4} {:<24} {}",
                        c.code,
                        c.symbol,
                        c.name,
                        if c.is_active { "active" } else { "inactive" }
                    )
                })
            }
            Self::Show { code } => {
                let currency = currencies.get(&code).await.map_err(action)?;
                console.print(&currency, |c| {
                    format!("{} {} ({}) active: {}", c.code, c.symbol, c.name, c.is_active)
                })
            }
            Self::Create {
                code,
                name,
                symbol,
                inactive,
            } => {
                let created = currencies
                    .create(&Currency {
                        code,
                        name,
                        symbol,
                        is_active: !inactive,
                    })
                    .await
                    .map_err(action)?;
                println!("Created currency {}", created.code);
                Ok(())
            }
            Self::Update {
                code,
                name,
                symbol,
                active,
            } => {
                let current = currencies.get(&code).await.map_err(action)?;
                let mut update = CurrencyUpdate::from(current);
                if let Some(name) = name {
                    update.name = name;
                }
                if let Some(symbol) = symbol {
                    update.symbol = symbol;
                }
                if let Some(active) = active {
                    update.is_active = active;
                }
                let updated = currencies.update(&code, &update).await.map_err(action)?;
                println!("Updated currency {}", updated.code);
                Ok(())
            }
            Self::Delete { code } => {
                currencies.delete(&code).await.map_err(action)?;
                println!("Deleted currency {code}");
                Ok(())
            }
            Self::Mine => {
                let assigned = currencies.mine().await.map_err(action)?;
                console.print_list(&assigned, |a| {
                    format!(
                        "{:<5} {}{}",
                        a.currency_code,
                        a.currency.name,
                        if a.is_default { "  (default)" } else { "" }
                    )
                })
            }
            Self::SetDefault { code } => {
                let code = code.to_ascii_uppercase();
                currencies.set_default(&code).await.map_err(action)?;
                println!("Default currency is now {code}");
                Ok(())
            }
            Self::OfUser { user_id } => {
                let assigned = currencies.for_user(user_id).await.map_err(action)?;
                console.print_list(&assigned, |a| {
                    format!(
                        "{:<5} {}{}",
                        a.currency_code,
                        a.currency.name,
                        if a.is_default { "  (default)" } else { "" }
                    )
                })
            }
            Self::Assign { user_id, code } => {
                let code = code.to_ascii_uppercase();
                currencies.assign(user_id, &code).await.map_err(action)?;
                println!("Assigned {code} to user {user_id}");
                Ok(())
            }
        }
    }
}

//! Command handlers. Each one plays a panel screen: it opens the screen path,
//! lets the route table decide, then calls the API.

use std::sync::Arc;

use serde::Serialize;
use siteadmin_core::api::dashboard;
use siteadmin_core::models::{RegisterRequest, User};
use siteadmin_core::router::{HistoryNavigator, Navigation, post_login_target};
use siteadmin_core::storage::FileBackend;
use siteadmin_core::{
    ClientConfig, GuardDecision, Location, Navigator, RouteTable, SessionManager, validation,
};
use tracing::{debug, info};

use crate::cli::ResourceKind;
use crate::{Error, Result};

pub struct Shell {
    session: SessionManager,
    navigator: Arc<HistoryNavigator>,
}

impl Shell {
    pub fn open(config: &ClientConfig, start: &str) -> Result<Self> {
        let backend = Arc::new(FileBackend::open(&config.storage_dir)?);
        let navigator = Arc::new(HistoryNavigator::new(start));
        let session = SessionManager::bootstrap(config, backend, navigator.clone())?;
        debug!(storage = %config.storage_dir.display(), api = %config.api_url, "shell opened");
        Ok(Self { session, navigator })
    }

    /// Restore the session and run the guards for `path`.
    async fn enter(&self, path: &str) -> Result<()> {
        let snapshot = self.session.initialize().await;
        if self.navigator.location().is_session_expired() {
            return Err(Error::SessionExpired);
        }
        let location = Location::parse(path);
        match RouteTable.authorize(&location, &snapshot) {
            GuardDecision::Allow => Ok(()),
            GuardDecision::Redirect(navigation) => {
                self.navigator.navigate(navigation);
                Err(Error::NotLoggedIn)
            }
            GuardDecision::AccessDenied => Err(Error::AccessDenied(location.pathname)),
            GuardDecision::Loading => Err(Error::Custom("session is still initializing".into())),
        }
    }

    /// Rewrite a rejected-session failure into the notice the login screen
    /// would show.
    pub fn finish<T>(&self, result: Result<T>) -> Result<T> {
        match result {
            Err(e) if e.is_unauthorized() && self.navigator.location().is_session_expired() => {
                debug!(error = %e, "request rejected");
                Err(Error::SessionExpired)
            }
            other => other,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        validation::login(email, password)?;
        self.session.initialize().await;
        let user = self.session.login(email, password).await?;
        let target = post_login_target(self.navigator.current().from.as_ref());
        self.navigator.navigate(Navigation::replace(target.clone()));
        println!("Logged in as {} <{}> ({})", user.full_name, user.email, user.role);
        info!(next = %target, "login complete");
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        self.session.initialize().await;
        self.session.logout().await;
        println!("Logged out");
        Ok(())
    }

    pub async fn whoami(&self) -> Result<()> {
        self.enter("/profile").await?;
        let user = self.session.state().user().ok_or(Error::NotLoggedIn)?;
        print_user(&user);
        Ok(())
    }

    pub async fn check(&self, path: &str) -> Result<()> {
        self.enter(path).await?;
        println!("allowed: {}", RouteTable.resolve(&Location::parse(path).pathname).path);
        Ok(())
    }

    pub async fn dashboard(&self) -> Result<()> {
        self.enter("/").await?;
        let stats = dashboard::summary(self.session.client()).await?;
        println!("Projects:            {}", stats.projects);
        println!("Applications:        {}", stats.applications);
        println!("Unread applications: {}", stats.unread_applications);
        Ok(())
    }

    pub async fn list(&self, resource: ResourceKind) -> Result<()> {
        self.enter(resource.screen()).await?;
        let client = self.session.client();
        match resource {
            ResourceKind::Hero => print_json(&client.hero().list().await?),
            ResourceKind::About => print_json(&client.about().fetch().await?),
            ResourceKind::Services => print_json(&client.services().list().await?),
            ResourceKind::Stats => print_json(&client.stats().list().await?),
            ResourceKind::Projects => print_json(&client.projects().list().await?),
            ResourceKind::Workflow => print_json(&client.workflow().list().await?),
            ResourceKind::Partners => print_json(&client.partners().list().await?),
            ResourceKind::Testimonials => print_json(&client.testimonials().list().await?),
            ResourceKind::ContactInfo => print_json(&client.contact_info().list().await?),
            ResourceKind::Socials => print_json(&client.socials().list().await?),
            ResourceKind::MapUrl => print_json(&client.map_url().get().await?),
            ResourceKind::Applications => print_json(&client.applications().list().await?),
            ResourceKind::Languages => print_json(&client.languages().list().await?),
            ResourceKind::Users => print_json(&client.auth().users().await?),
        }
    }

    pub async fn delete(&self, resource: ResourceKind, id: &str) -> Result<()> {
        self.enter(resource.screen()).await?;
        let client = self.session.client();
        match resource {
            ResourceKind::Hero => client.hero().delete(id).await?,
            ResourceKind::Services => client.services().delete(id).await?,
            ResourceKind::Stats => client.stats().delete(id).await?,
            ResourceKind::Projects => client.projects().delete(id).await?,
            ResourceKind::Workflow => client.workflow().delete(id).await?,
            ResourceKind::Partners => client.partners().delete(id).await?,
            ResourceKind::Testimonials => client.testimonials().delete(id).await?,
            ResourceKind::ContactInfo => client.contact_info().delete(id).await?,
            ResourceKind::Socials => client.socials().delete(id).await?,
            ResourceKind::Applications => client.applications().delete(id).await?,
            ResourceKind::Languages => client.languages().delete(id).await?,
            ResourceKind::Users => client.auth().delete_user(id).await?,
            ResourceKind::About | ResourceKind::MapUrl => {
                return Err(Error::Custom(format!(
                    "{} is a single record and cannot be deleted",
                    resource.screen()
                )));
            }
        };
        println!("Deleted {id}");
        Ok(())
    }

    pub async fn mark_viewed(&self, id: &str, is_viewed: bool) -> Result<()> {
        self.enter("/applications").await?;
        self.session
            .client()
            .applications()
            .mark_viewed(id, is_viewed)
            .await?;
        println!("Application {id} marked {}", if is_viewed { "read" } else { "unread" });
        Ok(())
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<()> {
        validation::register(&request.full_name, &request.email, &request.password)?;
        self.enter("/users/new").await?;
        self.session.client().auth().register(&request).await?;
        println!("Registered {}", request.email);
        Ok(())
    }

    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        validation::forgot_password(email)?;
        self.session.client().auth().send_otp(email).await?;
        println!("A one-time code was sent to {email}");
        Ok(())
    }

    pub async fn change_password(&self, email: &str, otp: &str, new_password: &str) -> Result<()> {
        validation::change_password(email, otp, new_password, new_password)?;
        self.session
            .client()
            .auth()
            .change_password(email, otp, new_password)
            .await?;
        println!("Password changed, log in with the new password");
        Ok(())
    }
}

fn print_user(user: &User) {
    println!("{} <{}>", user.full_name, user.email);
    println!("  id:   {}", user.id);
    println!("  role: {}", user.role);
    if !user.phone.is_empty() {
        println!("  phone: {}", user.phone);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

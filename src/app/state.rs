use std::sync::Arc;

use crate::components::{AboutView, FooterView, HomeView, Loadable, NavState, PageModel};
use crate::config::SiteConfig;
use crate::data::{
    AboutMe, HeroImage, HttpGet, Project, ReqwestFetcher, Services, SiteProperties, SocialIcons,
};

use super::session::SessionStore;

const HOME_HERO: &str = "home";
const ABOUT_HERO: &str = "about";

#[derive(Clone)]
pub struct AppState {
    pub(crate) sessions: Arc<SessionStore>,
    pub(crate) trust_proxy: bool,
}

impl AppState {
    pub fn new(http: Arc<dyn HttpGet>, session_capacity: usize, trust_proxy: bool) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new(http, session_capacity)),
            trust_proxy,
        }
    }
}

/// Composition root: one HTTP client per process, one set of services per page load.
pub fn build_state(config: &SiteConfig) -> anyhow::Result<AppState> {
    let fetcher = ReqwestFetcher::new(config.data_base_url.clone(), config.fetch_timeout)?;
    tracing::info!(
        data_base_url = %config.data_base_url,
        timeout_secs = config.fetch_timeout.as_secs(),
        session_capacity = config.session_capacity,
        "data services ready"
    );
    Ok(AppState::new(
        Arc::new(fetcher),
        config.session_capacity,
        config.trust_proxy,
    ))
}

/// What each service has settled to. The outer `Option` is `None` while a
/// fetch is still outstanding.
struct Settled {
    site: Option<Option<SiteProperties>>,
    home_hero: Option<Option<HeroImage>>,
    about_hero: Option<Option<HeroImage>>,
    projects: Option<Vec<Project>>,
    about: Option<Option<AboutMe>>,
    icons: Option<Option<SocialIcons>>,
}

impl Settled {
    fn into_page(self, nav: NavState) -> PageModel {
        let brand = self
            .site
            .as_ref()
            .and_then(|site| site.as_ref())
            .map(|site| site.name.clone());
        PageModel {
            brand,
            nav,
            home: HomeView::assemble(self.site.clone(), self.home_hero),
            about: AboutView::assemble(self.about, self.about_hero),
            portfolio: self.projects.into(),
            footer: FooterView::assemble(self.site, self.icons),
        }
    }
}

impl PageModel {
    /// Waits for every service, so each section comes back loaded unless its
    /// record-shaped data turned out to be unavailable.
    pub async fn resolve(services: &Services, nav: NavState) -> Self {
        let (site, home_hero, about_hero, projects, about, icons) = tokio::join!(
            services.site.get(),
            services.heroes.find(HeroImage::named(HOME_HERO)),
            services.heroes.find(HeroImage::named(ABOUT_HERO)),
            services.projects.get(),
            services.about.get(),
            services.icons.get(),
        );
        Settled {
            site: Some(site),
            home_hero: Some(home_hero),
            about_hero: Some(about_hero),
            projects: Some(projects),
            about: Some(about),
            icons: Some(icons),
        }
        .into_page(nav)
    }

    /// Starts any outstanding fetches and renders from whatever has settled.
    pub fn snapshot(services: &Services, nav: NavState) -> Self {
        services.prime_all();
        Settled {
            site: services.site.peek(),
            home_hero: services.heroes.find_resolved(HeroImage::named(HOME_HERO)),
            about_hero: services.heroes.find_resolved(HeroImage::named(ABOUT_HERO)),
            projects: services.projects.peek(),
            about: services.about.peek(),
            icons: services.icons.peek(),
        }
        .into_page(nav)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::data::testing::{FakeHttp, full_site};

    #[tokio::test]
    async fn resolve_loads_every_section() {
        let http = Arc::new(full_site());
        let services = Services::new(http.clone());
        let page = PageModel::resolve(&services, NavState::default()).await;

        assert_eq!(page.brand.as_deref(), Some("Ada Lovelace"));
        let Loadable::Loaded(home) = &page.home else {
            panic!("home should be loaded");
        };
        assert_eq!(home.hero.as_ref().map(|h| h.src.as_str()), Some("/img/home.jpg"));
        let Loadable::Loaded(about) = &page.about else {
            panic!("about should be loaded");
        };
        assert_eq!(about.hero.as_ref().map(|h| h.name.as_str()), Some("about"));
        assert!(page.portfolio.is_loaded());
        assert!(page.footer.is_loaded());
        assert_eq!(http.total_calls(), 5);
    }

    #[tokio::test]
    async fn missing_site_properties_keep_home_and_footer_loading() {
        let http = Arc::new(full_site().with_status("siteproperties.json", 404));
        let services = Services::new(http);
        let page = PageModel::resolve(&services, NavState::default()).await;

        assert_eq!(page.home, Loadable::Loading);
        assert_eq!(page.footer, Loadable::Loading);
        assert!(page.about.is_loaded());
        assert!(page.portfolio.is_loaded());
        assert_eq!(page.brand, None);
    }

    #[tokio::test]
    async fn snapshot_is_loading_until_fetches_settle() {
        let http = Arc::new(full_site().with_delay(Duration::from_millis(20)));
        let services = Services::new(http.clone());

        let first = PageModel::snapshot(&services, NavState::default());
        assert_eq!(first.home, Loadable::Loading);
        assert_eq!(first.portfolio, Loadable::Loading);

        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = PageModel::snapshot(&services, NavState::default());
        assert!(second.home.is_loaded());
        assert!(second.portfolio.is_loaded());
        assert_eq!(http.total_calls(), 5);
    }

    #[tokio::test]
    async fn empty_project_list_is_loaded() {
        let http = Arc::new(FakeHttp::new().with_body("projects.json", "[]"));
        let services = Services::new(http);
        let page = PageModel::resolve(&services, NavState::default()).await;
        assert_eq!(page.portfolio, Loadable::Loaded(Vec::new()));
    }
}

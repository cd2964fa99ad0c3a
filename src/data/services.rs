use std::sync::Arc;

use super::cache::CachedResource;
use super::fetch::HttpGet;
use super::models::{AboutMe, HeroImage, Project, SiteProperties, SocialIcons};

pub const SITE_PROPERTIES_PATH: &str = "siteproperties.json";
pub const HERO_IMAGES_PATH: &str = "heroimages.json";
pub const PROJECTS_PATH: &str = "projects.json";
pub const ABOUT_ME_PATH: &str = "aboutme.json";
pub const SOCIAL_ICONS_PATH: &str = "socialicons.json";

pub struct SitePropertiesService {
    resource: CachedResource<Option<SiteProperties>>,
}

impl SitePropertiesService {
    pub fn new(http: Arc<dyn HttpGet>) -> Self {
        Self {
            resource: CachedResource::new(SITE_PROPERTIES_PATH, http),
        }
    }

    pub async fn get(&self) -> Option<SiteProperties> {
        self.resource.get().await
    }

    pub fn peek(&self) -> Option<Option<SiteProperties>> {
        self.resource.peek()
    }
}

pub struct HeroImageService {
    resource: CachedResource<Vec<HeroImage>>,
}

impl HeroImageService {
    pub fn new(http: Arc<dyn HttpGet>) -> Self {
        Self {
            resource: CachedResource::new(HERO_IMAGES_PATH, http),
        }
    }

    pub async fn get(&self) -> Vec<HeroImage> {
        self.resource.get().await
    }

    /// First hero image matching `predicate`, fetching the list on first use.
    pub async fn find<P>(&self, predicate: P) -> Option<HeroImage>
    where
        P: Fn(&HeroImage) -> bool,
    {
        self.resource
            .get()
            .await
            .into_iter()
            .find(|image| predicate(image))
    }

    /// Like [`find`](Self::find) but without waiting: `None` until the list has settled.
    pub fn find_resolved<P>(&self, predicate: P) -> Option<Option<HeroImage>>
    where
        P: Fn(&HeroImage) -> bool,
    {
        self.resource
            .peek()
            .map(|images| images.into_iter().find(|image| predicate(image)))
    }
}

pub struct ProjectService {
    resource: CachedResource<Vec<Project>>,
}

impl ProjectService {
    pub fn new(http: Arc<dyn HttpGet>) -> Self {
        Self {
            resource: CachedResource::new(PROJECTS_PATH, http),
        }
    }

    pub async fn get(&self) -> Vec<Project> {
        self.resource.get().await
    }

    pub fn peek(&self) -> Option<Vec<Project>> {
        self.resource.peek()
    }
}

pub struct AboutMeService {
    resource: CachedResource<Option<AboutMe>>,
}

impl AboutMeService {
    pub fn new(http: Arc<dyn HttpGet>) -> Self {
        Self {
            resource: CachedResource::new(ABOUT_ME_PATH, http),
        }
    }

    pub async fn get(&self) -> Option<AboutMe> {
        self.resource.get().await
    }

    pub fn peek(&self) -> Option<Option<AboutMe>> {
        self.resource.peek()
    }
}

pub struct SocialIconsService {
    resource: CachedResource<Option<SocialIcons>>,
}

impl SocialIconsService {
    pub fn new(http: Arc<dyn HttpGet>) -> Self {
        Self {
            resource: CachedResource::new(SOCIAL_ICONS_PATH, http),
        }
    }

    pub async fn get(&self) -> Option<SocialIcons> {
        self.resource.get().await
    }

    pub fn peek(&self) -> Option<Option<SocialIcons>> {
        self.resource.peek()
    }
}

/// The five accessors, built once and shared by every request.
pub struct Services {
    pub site: SitePropertiesService,
    pub heroes: HeroImageService,
    pub projects: ProjectService,
    pub about: AboutMeService,
    pub icons: SocialIconsService,
}

impl Services {
    pub fn new(http: Arc<dyn HttpGet>) -> Self {
        Self {
            site: SitePropertiesService::new(Arc::clone(&http)),
            heroes: HeroImageService::new(Arc::clone(&http)),
            projects: ProjectService::new(Arc::clone(&http)),
            about: AboutMeService::new(Arc::clone(&http)),
            icons: SocialIconsService::new(http),
        }
    }

    /// Kick off every fetch that has not started yet.
    pub fn prime_all(&self) {
        self.site.resource.prime();
        self.heroes.resource.prime();
        self.projects.resource.prime();
        self.about.resource.prime();
        self.icons.resource.prime();
    }
}

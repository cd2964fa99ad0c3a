use leptos::prelude::*;

use crate::data::{AboutMe, HeroImage, Platform, Project, SiteProperties, SocialIcons};

/// Two-state render contract shared by every section.
#[derive(Clone, Debug, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Loaded(T),
}

impl<T> Loadable<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Loadable::Loaded(_))
    }
}

impl<T> From<Option<T>> for Loadable<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Loadable::Loading, Loadable::Loaded)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HomeView {
    pub site: SiteProperties,
    pub hero: Option<HeroImage>,
}

impl HomeView {
    /// Loaded once site properties are present and the hero list has settled.
    pub fn assemble(
        site: Option<Option<SiteProperties>>,
        hero: Option<Option<HeroImage>>,
    ) -> Loadable<Self> {
        site.flatten()
            .zip(hero)
            .map(|(site, hero)| HomeView { site, hero })
            .into()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AboutView {
    pub about: AboutMe,
    pub hero: Option<HeroImage>,
}

impl AboutView {
    pub fn assemble(
        about: Option<Option<AboutMe>>,
        hero: Option<Option<HeroImage>>,
    ) -> Loadable<Self> {
        about
            .flatten()
            .zip(hero)
            .map(|(about, hero)| AboutView { about, hero })
            .into()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SocialLink {
    pub platform: Platform,
    pub href: String,
    pub icon: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FooterView {
    pub name: String,
    pub links: Vec<SocialLink>,
}

impl FooterView {
    /// Loaded once both documents are present. A platform is linked only when
    /// it has an icon and a profile URL.
    pub fn assemble(
        site: Option<Option<SiteProperties>>,
        icons: Option<Option<SocialIcons>>,
    ) -> Loadable<Self> {
        let (Some(site), Some(icons)) = (site.flatten(), icons.flatten()) else {
            return Loadable::Loading;
        };
        let links = Platform::ALL
            .into_iter()
            .filter_map(|platform| {
                let icon = icons.icon(platform)?;
                let href = site.profile_url(platform)?;
                Some(SocialLink {
                    platform,
                    href,
                    icon: icon.to_string(),
                })
            })
            .collect();
        Loadable::Loaded(FooterView {
            name: site.name,
            links,
        })
    }
}

#[component]
pub fn LoadingIndicator() -> impl IntoView {
    view! {
        <div class="loading" role="status">
            <span class="spinner" aria-hidden="true"></span>
            <span class="sr-only">"Loading..."</span>
        </div>
    }
}

#[component]
fn HeroBanner(hero: Option<HeroImage>) -> impl IntoView {
    hero.map(|hero| {
        view! { <img class="hero-image" src=hero.src alt=hero.alt loading="lazy" decoding="async" /> }
    })
}

#[component]
pub fn HomeSection(state: Loadable<HomeView>) -> impl IntoView {
    let body = match state {
        Loadable::Loading => view! { <LoadingIndicator /> }.into_any(),
        Loadable::Loaded(home) => view! {
            <HeroBanner hero=home.hero />
            <div class="home-intro">
                <h1 class="home-name">{home.site.name}</h1>
                <p class="home-title">{home.site.title}</p>
                <a class="button" href="#portfolio">"See my work"</a>
            </div>
        }
        .into_any(),
    };
    view! { <section id="home" class="section section-home">{body}</section> }
}

#[component]
pub fn AboutSection(state: Loadable<AboutView>) -> impl IntoView {
    let body = match state {
        Loadable::Loading => view! { <LoadingIndicator /> }.into_any(),
        Loadable::Loaded(AboutView { about, hero }) => view! {
            <h2>"About"</h2>
            <HeroBanner hero=hero />
            <p class="about-description">{about.description}</p>
            <TagList kind="skills" heading="Skills" items=about.skills />
            <TagList kind="learning" heading="Currently learning" items=about.currently_learning />
            <blockquote class="about-quote">{about.detail_or_quote}</blockquote>
        }
        .into_any(),
    };
    view! { <section id="about" class="section section-about">{body}</section> }
}

#[component]
fn TagList(kind: &'static str, heading: &'static str, items: Vec<String>) -> impl IntoView {
    if items.is_empty() {
        return None;
    }
    let chips = items
        .into_iter()
        .map(|item| view! { <li class="tag">{item}</li> })
        .collect_view();
    Some(view! {
        <div class=format!("tag-list {kind}")>
            <h3>{heading}</h3>
            <ul>{chips}</ul>
        </div>
    })
}

#[component]
pub fn PortfolioSection(state: Loadable<Vec<Project>>) -> impl IntoView {
    let body = match state {
        Loadable::Loading => view! { <LoadingIndicator /> }.into_any(),
        Loadable::Loaded(projects) => {
            let cards = projects
                .into_iter()
                .map(|project| view! { <ProjectCard project=project /> })
                .collect_view();
            view! {
                <h2>"Portfolio"</h2>
                <div class="project-grid">{cards}</div>
            }
            .into_any()
        }
    };
    view! { <section id="portfolio" class="section section-portfolio">{body}</section> }
}

#[component]
fn ProjectCard(project: Project) -> impl IntoView {
    let link = project.link().map(|url| {
        let url = url.to_string();
        view! {
            <a class="project-link" href=url target="_blank" rel="noreferrer">"View project"</a>
        }
    });
    view! {
        <article class="project-card">
            <h3>{project.title}</h3>
            <p>{project.description}</p>
            {link}
        </article>
    }
}

#[component]
pub fn FooterSection(state: Loadable<FooterView>) -> impl IntoView {
    let body = match state {
        Loadable::Loading => view! { <LoadingIndicator /> }.into_any(),
        Loadable::Loaded(footer) => {
            let links = footer
                .links
                .into_iter()
                .map(|link| {
                    view! {
                        <a
                            class="social-link"
                            href=link.href
                            target="_blank"
                            rel="noreferrer"
                            aria-label=link.platform.label()
                        >
                            <img src=link.icon alt="" width="28" height="28" />
                        </a>
                    }
                })
                .collect_view();
            view! {
                <div class="social-links">{links}</div>
                <p class="copyright">{format!("© {}", footer.name)}</p>
            }
            .into_any()
        }
    };
    view! { <footer id="contact" class="section site-footer">{body}</footer> }
}

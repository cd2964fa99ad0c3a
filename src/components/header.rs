use leptos::prelude::*;

/// Page sections the header links to, in nav order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SectionId {
    Home,
    About,
    Portfolio,
    Contact,
}

impl SectionId {
    pub const ALL: [SectionId; 4] = [
        SectionId::Home,
        SectionId::About,
        SectionId::Portfolio,
        SectionId::Contact,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionId::Home => "home",
            SectionId::About => "about",
            SectionId::Portfolio => "portfolio",
            SectionId::Contact => "contact",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "home" => Some(SectionId::Home),
            "about" => Some(SectionId::About),
            "portfolio" => Some(SectionId::Portfolio),
            "contact" => Some(SectionId::Contact),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SectionId::Home => "Home",
            SectionId::About => "About",
            SectionId::Portfolio => "Portfolio",
            SectionId::Contact => "Contact",
        }
    }
}

/// Which nav links are highlighted. Fed by the page's scroll tracking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavState {
    active: Vec<SectionId>,
}

impl Default for NavState {
    fn default() -> Self {
        Self {
            active: vec![SectionId::Home],
        }
    }
}

impl NavState {
    /// Replace the active set with the recognised ids from `visible`.
    pub fn update_visible<'a, I>(&mut self, visible: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let seen: Vec<SectionId> = visible.into_iter().filter_map(SectionId::parse).collect();
        self.active = SectionId::ALL
            .into_iter()
            .filter(|id| seen.contains(id))
            .collect();
    }

    pub fn from_visible(visible: &str) -> Self {
        let mut state = Self::default();
        state.update_visible(visible.split(',').filter(|s| !s.trim().is_empty()));
        state
    }

    pub fn is_active(&self, id: SectionId) -> bool {
        self.active.contains(&id)
    }

    pub fn active(&self) -> &[SectionId] {
        &self.active
    }
}

#[component]
pub fn HeaderNav(brand: Option<String>, nav: NavState) -> impl IntoView {
    let links = SectionId::ALL
        .into_iter()
        .map(|id| {
            let active = nav.is_active(id);
            view! {
                <li>
                    <a
                        class=if active { "nav-link active" } else { "nav-link" }
                        href=format!("#{}", id.as_str())
                        data-section=id.as_str()
                        aria-current=active.then_some("location")
                    >
                        {id.label()}
                    </a>
                </li>
            }
        })
        .collect_view();
    view! {
        <header id="site-header" class="site-header">
            <nav class="site-nav">
                <a class="brand" href="#home">{brand.unwrap_or_default()}</a>
                <ul class="nav-links">{links}</ul>
            </nav>
        </header>
    }
}

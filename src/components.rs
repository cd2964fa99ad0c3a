mod header;
mod sections;

pub use header::{HeaderNav, NavState, SectionId};
pub use sections::{
    AboutSection, AboutView, FooterSection, FooterView, HomeSection, HomeView, Loadable,
    PortfolioSection,
};

use leptos::prelude::*;

use crate::data::Project;

/// Every section of the page, each in its own loading or loaded state.
#[derive(Clone, Debug)]
pub struct PageModel {
    pub brand: Option<String>,
    pub nav: NavState,
    pub home: Loadable<HomeView>,
    pub about: Loadable<AboutView>,
    pub portfolio: Loadable<Vec<Project>>,
    pub footer: Loadable<FooterView>,
}

#[component]
pub fn PortfolioPage(page: PageModel) -> impl IntoView {
    view! {
        <div class="page">
            <HeaderNav brand=page.brand nav=page.nav />
            <main>
                <HomeSection state=page.home />
                <AboutSection state=page.about />
                <PortfolioSection state=page.portfolio />
            </main>
            <FooterSection state=page.footer />
        </div>
    }
}

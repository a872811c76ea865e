//! Catalog items and the site's static catalog tables.

use serde::{Deserialize, Serialize};

/// An item whose imagery can be generated on demand.
///
/// `id` is the stable identity used by the renderer; `title` and
/// `description` (or `prompt` when present) define the generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Explicit generation context, used instead of `description`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Static image shown until (or instead of) a generated one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_image: Option<String>,
}

impl CatalogItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            prompt: None,
            fallback_image: None,
        }
    }

    /// Set an explicit generation prompt.
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set the static fallback image URL.
    pub fn fallback_image(mut self, url: impl Into<String>) -> Self {
        self.fallback_image = Some(url.into());
        self
    }
}

const VANGUARD_IMAGE: &str =
    "https://images.unsplash.com/photo-1506947411487-a56738267384?q=80&w=800&auto=format&fit=crop";
const NAVIGATOR_IMAGE: &str =
    "https://images.unsplash.com/photo-1507581134176-1b32d0342921?q=80&w=800&auto=format&fit=crop";
const SENTINEL_IMAGE: &str =
    "https://images.unsplash.com/photo-1527977966376-1c8408f9f108?q=80&w=800&auto=format&fit=crop";
const AEROLIFT_IMAGE: &str =
    "https://images.unsplash.com/photo-1559627768-e491e847cd62?q=80&w=800&auto=format&fit=crop";

/// The three products on the home page.
pub fn featured_products() -> Vec<CatalogItem> {
    vec![
        CatalogItem::new(
            "vanguard",
            "The Vanguard X100",
            "A versatile drone platform for a wide range of applications, known for its reliability and performance.",
        )
        .fallback_image(VANGUARD_IMAGE),
        CatalogItem::new(
            "navigator",
            "The Navigator Pro",
            "An advanced control system offering enhanced precision and control for complex drone operations.",
        )
        .fallback_image(NAVIGATOR_IMAGE),
        CatalogItem::new(
            "sentinel",
            "The Sentinel Series",
            "A series of drones equipped with specialized sensors for specific industry needs, ensuring optimal data collection.",
        )
        .fallback_image(SENTINEL_IMAGE),
    ]
}

/// Full product listing.
pub fn product_list() -> Vec<CatalogItem> {
    vec![
        CatalogItem::new(
            "vanguard",
            "The Vanguard X100",
            "A versatile drone platform for a wide range of applications, known for its reliability and performance in extreme conditions.",
        )
        .fallback_image(VANGUARD_IMAGE),
        CatalogItem::new(
            "navigator",
            "The Navigator Pro",
            "An advanced control system offering enhanced precision and control for complex drone operations and autonomous pathing.",
        )
        .fallback_image(NAVIGATOR_IMAGE),
        CatalogItem::new(
            "sentinel",
            "The Sentinel Series",
            "A series of drones equipped with specialized sensors for specific industry needs, ensuring optimal data collection.",
        )
        .fallback_image(SENTINEL_IMAGE),
        CatalogItem::new(
            "aerolift",
            "AeroLift Cargo",
            "Heavy-lift autonomous drone designed for logistics and supply chain optimization in remote areas.",
        )
        .fallback_image(AEROLIFT_IMAGE),
    ]
}

// (category id, title, description, image prompt)
const SOLUTIONS: &[(&str, &str, &str, &str)] = &[
    (
        "aerial-imaging",
        "Aerial Imaging",
        "Leverage state-of-the-art LiDAR and photogrammetry sensors to create digital twins, topographic maps, and 3D models with centimeter-level accuracy.",
        "A drone conducting high tech aerial survey mapping over a landscape, digital grid overlay",
    ),
    (
        "infrastructure",
        "Infrastructure Inspection",
        "Ensure the safety and longevity of your assets. Our automated drone inspections identify structural defects, corrosion, and wear in bridges, towers, and pipelines.",
        "Industrial drone inspecting a massive bridge structure or wind turbine, high tech visuals",
    ),
    (
        "security",
        "Security Solutions",
        "Deploy autonomous drone fleets for 24/7 perimeter security, event monitoring, and rapid response. Integrated with AI for real-time threat detection.",
        "Surveillance drone patrolling a secure facility at night with infrared camera visuals",
    ),
    (
        "environmental",
        "Environmental",
        "Monitor ecosystems, track wildlife populations, and assess forest health with non-invasive aerial technology designed for conservation.",
        "Drone flying over a lush forest or green landscape monitoring wildlife, eco friendly tech",
    ),
    (
        "emergency",
        "Emergency Response",
        "Rapid deployment drones equipped with thermal cameras and drop mechanisms to assist first responders in critical search and rescue operations.",
        "Search and rescue drone flying in a rugged environment with thermal camera overlay graphics",
    ),
];

/// Look up a solution category by its route identifier.
///
/// The returned item carries the category's explicit image prompt.
pub fn solution(category: &str) -> Option<CatalogItem> {
    SOLUTIONS
        .iter()
        .find(|(id, ..)| *id == category)
        .map(|(id, title, description, prompt)| {
            CatalogItem::new(*id, *title, *description).prompt(*prompt)
        })
}

/// Route identifiers of every solution category.
pub fn solution_categories() -> impl Iterator<Item = &'static str> {
    SOLUTIONS.iter().map(|(id, ..)| *id)
}

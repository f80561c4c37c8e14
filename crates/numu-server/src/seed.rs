use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone, Utc};
use tracing::info;
use uuid::Uuid;

use numu_core::Marketplace;
use numu_types::models::Equipment;

/// Owner of the demo listings.
pub const DEMO_OWNER_ID: Uuid = Uuid::from_u128(0x6e75_6d75_0000_4000_8000_0000_0000_0003);

struct Demo {
    name: &'static str,
    description: &'static str,
    category: &'static str,
    city: &'static str,
    location: &'static str,
    day_rate: u64,
    week_rate: u64,
    owner_name: &'static str,
    rating: f64,
    reviews_count: u32,
    available: bool,
    image: &'static str,
    specs: [(&'static str, &'static str); 4],
    listed: (i32, u32, u32),
}

const DEMOS: [Demo; 6] = [
    Demo {
        name: "جرار زراعي جون ديري 6120M",
        description: "جرار قوي ومتعدد الاستخدامات مناسب لجميع الأعمال الزراعية. قوة المحرك 120 حصان مع نظام هيدروليكي متقدم.",
        category: "tractors",
        city: "الرياض",
        location: "الرياض",
        day_rate: 800,
        week_rate: 4500,
        owner_name: "شركة النخبة للمعدات",
        rating: 4.8,
        reviews_count: 24,
        available: true,
        image: "🚜",
        specs: [
            ("قوة المحرك", "120 حصان"),
            ("نوع الوقود", "ديزل"),
            ("سنة الصنع", "2022"),
            ("حالة المعدة", "ممتازة"),
        ],
        listed: (2024, 1, 15),
    },
    Demo {
        name: "حصادة القمح كلاس ليكسيون 770",
        description: "حصادة عالية الكفاءة لحصاد القمح والشعير والأرز. تقنية GPS مدمجة مع نظام فصل ذكي.",
        category: "harvesters",
        city: "بريدة",
        location: "القصيم",
        day_rate: 1500,
        week_rate: 8000,
        owner_name: "مؤسسة الحصاد الذهبي",
        rating: 4.9,
        reviews_count: 18,
        available: true,
        image: "🌾",
        specs: [
            ("عرض الحصاد", "9 متر"),
            ("سعة الخزان", "12,000 لتر"),
            ("سنة الصنع", "2023"),
            ("حالة المعدة", "جديدة"),
        ],
        listed: (2024, 2, 1),
    },
    Demo {
        name: "نظام ري محوري Valley",
        description: "نظام ري محوري متكامل للمزارع الكبيرة. تحكم ذكي عن بعد مع مستشعرات رطوبة التربة.",
        category: "irrigation",
        city: "سكاكا",
        location: "الجوف",
        day_rate: 500,
        week_rate: 2800,
        owner_name: "شركة المياه الخضراء",
        rating: 4.7,
        reviews_count: 31,
        available: false,
        image: "💧",
        specs: [
            ("طول الذراع", "400 متر"),
            ("المساحة المغطاة", "50 هكتار"),
            ("نوع التحكم", "ذكي عن بعد"),
            ("حالة المعدة", "جيدة جداً"),
        ],
        listed: (2024, 1, 20),
    },
    Demo {
        name: "رشاش مبيدات John Deere R4045",
        description: "رشاش مبيدات عالي الدقة مع نظام GPS لتجنب الرش المكرر. خزان بسعة 4500 لتر.",
        category: "sprayers",
        city: "المدينة المنورة",
        location: "المدينة المنورة",
        day_rate: 600,
        week_rate: 3500,
        owner_name: "مؤسسة الزراعة الحديثة",
        rating: 4.6,
        reviews_count: 15,
        available: true,
        image: "🌿",
        specs: [
            ("سعة الخزان", "4,500 لتر"),
            ("عرض الرش", "36 متر"),
            ("نوع الفوهات", "متغيرة"),
            ("حالة المعدة", "ممتازة"),
        ],
        listed: (2024, 3, 1),
    },
    Demo {
        name: "محراث قلاب 5 سكك",
        description: "محراث قلاب قوي لتجهيز التربة. مناسب للتربة الثقيلة والمتوسطة.",
        category: "ploughs",
        city: "حائل",
        location: "حائل",
        day_rate: 300,
        week_rate: 1600,
        owner_name: "معدات الشمال",
        rating: 4.5,
        reviews_count: 22,
        available: true,
        image: "⛏️",
        specs: [
            ("عدد السكك", "5"),
            ("عمق الحرث", "حتى 40 سم"),
            ("الوزن", "1,200 كجم"),
            ("حالة المعدة", "جيدة"),
        ],
        listed: (2024, 2, 15),
    },
    Demo {
        name: "طائرة درون زراعية DJI Agras T40",
        description: "طائرة رش ذكية للمساحات الكبيرة. رش دقيق مع تقنية تجنب العوائق.",
        category: "drones",
        city: "الهفوف",
        location: "الأحساء",
        day_rate: 400,
        week_rate: 2200,
        owner_name: "تقنيات المستقبل الزراعية",
        rating: 4.9,
        reviews_count: 28,
        available: true,
        image: "🚁",
        specs: [
            ("سعة الخزان", "40 لتر"),
            ("معدل الرش", "16 لتر/دقيقة"),
            ("وقت الطيران", "30 دقيقة"),
            ("حالة المعدة", "جديدة"),
        ],
        listed: (2024, 3, 10),
    },
];

pub fn demo_listings() -> Vec<Equipment> {
    DEMOS
        .iter()
        .map(|d| {
            let (y, m, day) = d.listed;
            let created_at = NaiveDate::from_ymd_opt(y, m, day)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|dt| Utc.from_utc_datetime(&dt))
                .unwrap_or_else(Utc::now);
            Equipment {
                id: Uuid::new_v4(),
                name: d.name.to_string(),
                description: d.description.to_string(),
                category: d.category.to_string(),
                city: d.city.to_string(),
                location: d.location.to_string(),
                day_rate: d.day_rate,
                week_rate: d.week_rate,
                owner_id: DEMO_OWNER_ID,
                owner_name: d.owner_name.to_string(),
                rating: d.rating,
                reviews_count: d.reviews_count,
                available: d.available,
                image: d.image.to_string(),
                specifications: d
                    .specs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<BTreeMap<_, _>>(),
                created_at,
            }
        })
        .collect()
}

/// Adds the demo listings to an empty catalog. Returns how many were added.
pub fn seed_if_empty(market: &mut Marketplace) -> usize {
    if !market.catalog().is_empty() {
        return 0;
    }
    // Catalog inserts at the front, so add oldest entries last.
    let mut added = 0;
    for listing in demo_listings().into_iter().rev() {
        if market.import_equipment(listing) {
            added += 1;
        }
    }
    info!("Seeded {} demo listings", added);
    added
}

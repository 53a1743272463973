//! Liability waiver ("carta responsiva") documents.
//!
//! Each waiver is a typst markup document compiled in-process with the
//! fonts bundled by `typst-assets`, so rendering needs no system fonts and
//! no network access. Batches are bundled into a tar archive.

use anyhow::{anyhow, Context};
use chrono::{Datelike, Local, NaiveDate};
use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};
use tracing::{info, warn};
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source, VirtualPath};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use super::commands::exports::Download;
use super::commands::waivers::WaiverSelection;
use super::error::{DomainError, DomainResult};
use super::models::client::Client;
use crate::storage::{AttendanceStorage, ClientStorage};

const PDF_CONTENT_TYPE: &str = "application/pdf";
const TAR_CONTENT_TYPE: &str = "application/x-tar";

static LIBRARY: LazyLock<LazyHash<Library>> = LazyLock::new(|| LazyHash::new(Library::builder().build()));

static FONTS: LazyLock<(LazyHash<FontBook>, Vec<Font>)> = LazyLock::new(|| {
    let fonts: Vec<Font> = typst_assets::fonts()
        .flat_map(|data| Font::iter(Bytes::new(data)))
        .collect();
    let book = FontBook::from_fonts(&fonts);
    (LazyHash::new(book), fonts)
});

/// Single-file world holding one waiver document
struct WaiverWorld {
    main_id: FileId,
    source: Source,
    today: NaiveDate,
}

impl WaiverWorld {
    fn new(markup: String, today: NaiveDate) -> Self {
        let main_id = FileId::new(None, VirtualPath::new("waiver.typ"));
        let source = Source::new(main_id, markup);
        Self { main_id, source, today }
    }
}

impl World for WaiverWorld {
    fn library(&self) -> &LazyHash<Library> {
        &LIBRARY
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &FONTS.0
    }

    fn main(&self) -> FileId {
        self.main_id
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main_id {
            Ok(self.source.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        FONTS.1.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        Datetime::from_ymd(self.today.year(), self.today.month() as u8, self.today.day() as u8)
    }
}

#[derive(Clone)]
pub struct WaiverService {
    clients: Arc<dyn ClientStorage>,
    attendances: Arc<dyn AttendanceStorage>,
}

impl WaiverService {
    pub fn new(clients: Arc<dyn ClientStorage>, attendances: Arc<dyn AttendanceStorage>) -> Self {
        Self { clients, attendances }
    }

    /// Waiver PDF for one client
    pub async fn client_waiver(&self, client_id: i64) -> DomainResult<Download> {
        self.client_waiver_on(client_id, Local::now().date_naive()).await
    }

    pub async fn client_waiver_on(&self, client_id: i64, today: NaiveDate) -> DomainResult<Download> {
        let client = self
            .clients
            .get_client(client_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Client", client_id))?;

        let bytes = render_off_thread(client.clone(), today).await?;
        let filename = format!(
            "waiver_{}_{}_{}.pdf",
            filename_part(&client.first_name),
            filename_part(&client.last_name),
            today.format("%Y-%m-%d")
        );

        info!("📄 WAIVER: Rendered {} ({} bytes)", filename, bytes.len());
        Ok(Download { filename, content_type: PDF_CONTENT_TYPE, bytes })
    }

    /// One waiver per selected client, bundled as a tar archive
    pub async fn batch(&self, selection: WaiverSelection) -> DomainResult<Download> {
        self.batch_on(selection, Local::now().date_naive()).await
    }

    pub async fn batch_on(&self, selection: WaiverSelection, today: NaiveDate) -> DomainResult<Download> {
        let clients = self.select_clients(&selection).await?;
        if clients.is_empty() {
            warn!("Waiver batch {:?} selected no clients", selection);
            return Err(DomainError::field("selection", "No clients match this selection."));
        }

        let mut builder = tar::Builder::new(Vec::new());
        let mtime = Local::now().timestamp().max(0) as u64;

        for client in &clients {
            let bytes = render_off_thread(client.clone(), today).await?;
            let name = format!(
                "waiver_{}_{}_{}.pdf",
                filename_part(&client.first_name),
                filename_part(&client.last_name),
                client.id
            );

            let mut header = tar::Header::new_gnu();
            header.set_size(bytes.len() as u64);
            header.set_mode(0o644);
            header.set_mtime(mtime);
            builder
                .append_data(&mut header, &name, bytes.as_slice())
                .with_context(|| format!("failed to add {} to archive", name))?;
        }

        let archive = builder.into_inner().context("failed to finish waiver archive")?;
        let filename = format!("waivers_{}.tar", today.format("%Y-%m-%d"));

        info!("📄 WAIVER: Bundled {} waivers into {}", clients.len(), filename);
        Ok(Download { filename, content_type: TAR_CONTENT_TYPE, bytes: archive })
    }

    async fn select_clients(&self, selection: &WaiverSelection) -> DomainResult<Vec<Client>> {
        let ids: Vec<i64> = match selection {
            WaiverSelection::AllActive => {
                let clients = self.clients.list_clients().await?;
                return Ok(clients.into_iter().filter(|c| c.is_active).collect());
            }
            WaiverSelection::Event(event_id) => self.attendances.client_ids_for_event(*event_id).await?,
            WaiverSelection::DateRange { from, to } => {
                if from > to {
                    return Err(DomainError::field("to", "The end date cannot be before the start date."));
                }
                self.attendances.client_ids_between(*from, *to).await?
            }
            WaiverSelection::Clients(ids) => ids.clone(),
        };

        let mut clients = Vec::new();
        let unique: BTreeSet<i64> = ids.into_iter().collect();
        for id in unique {
            let client = self
                .clients
                .get_client(id)
                .await?
                .ok_or_else(|| DomainError::not_found("Client", id))?;
            clients.push(client);
        }
        Ok(clients)
    }
}

async fn render_off_thread(client: Client, today: NaiveDate) -> DomainResult<Vec<u8>> {
    let bytes = tokio::task::spawn_blocking(move || render_waiver_pdf(&client, today))
        .await
        .context("waiver rendering task failed")??;
    Ok(bytes)
}

/// Compile the waiver for `client` into PDF bytes
pub fn render_waiver_pdf(client: &Client, today: NaiveDate) -> anyhow::Result<Vec<u8>> {
    let world = WaiverWorld::new(waiver_markup(&client.full_name(), client.phone.as_deref()), today);

    let document = typst::compile(&world)
        .output
        .map_err(|errors| anyhow!("waiver compilation failed: {:?}", errors))?;

    typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| anyhow!("waiver PDF export failed: {:?}", errors))
}

/// Typst source of the waiver. Client data enters only as string literals.
fn waiver_markup(full_name: &str, phone: Option<&str>) -> String {
    let phone_line = match phone {
        Some(phone) => format!("#{}", typst_string(phone)),
        None => "#blank".to_string(),
    };

    format!(
        r#"#set page(paper: "us-letter", margin: 2cm)
#set text(size: 12pt, lang: "es")
#set par(justify: true)
#let full_name = {name}
#let blank = box(width: 7cm, height: 0.8em, stroke: (bottom: 0.5pt))
#let answer = [Sí \[ #h(0.3em) \] #h(2em) No \[ #h(0.3em) \]]

#align(center, text(size: 16pt, weight: "bold")[¡Bienvenido a Senda del Colibrí!])

Nos sentimos honrados de acompañarte en este viaje de sanación y transformación. Estamos comprometidos con tu bienestar y con brindarte una experiencia segura y enriquecedora. Por favor, lee detenidamente esta responsiva antes de participar.

*Yo, #upper(full_name), ACEPTO TOMAR ESTA EXPERIENCIA DE MEDICINAS ANCESTRALES BAJO MI PROPIA RESPONSABILIDAD Y CON MI TOTAL CONSENTIMIENTO. DESLINDO DE TODA RESPONSABILIDAD A TERCERAS PERSONAS Y AL ESTABLECIMIENTO DONDE SE LLEVARÁ A CABO LA EXPERIENCIA.*

*NOTA:*

Las medicinas ancestrales son extractos de raíces y plantas naturales heredadas por nuestros ancestros y transmitidas de generación en generación hasta llegar a nuestros días. Se busca que estas herramientas beneficien al cuerpo, sanen el alma y ayuden en la curación de enfermedades, adicciones, y en la elevación de la conciencia a un nivel superior.

Declaro que mi estado de salud física y mental es óptimo para participar en esta experiencia. Entiendo que la ingesta de estas medicinas es responsabilidad exclusiva de quien las consume, y reconozco que esta práctica no sustituye tratamientos médicos o psicológicos.

#v(1em)
Firma: #blank

Fecha: #blank

Celular: {phone_line}
#v(1em)

*¿Sufre o sospecha sufrir de algún trastorno psicológico como esquizofrenia, bipolaridad u otros problemas de salud mental?*

#answer

*¿Está actualmente embarazada o sospecha que podría estarlo?*

#answer

*¿Ha tomado medicamentos controlados (ansiolíticos, antidepresivos, antipsicóticos, entre otros) en las últimas 24 horas?*

#answer
"#,
        name = typst_string(full_name),
        phone_line = phone_line,
    )
}

/// Quote text as a typst string literal
fn typst_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' | '\r' | '\t' => out.push(' '),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// Name fragment safe to use inside a download filename
fn filename_part(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity update.
#[derive(Clone, Copy, Debug)]
pub struct Update;

/// Marker type describing an entity deletion.
#[derive(Clone, Copy, Debug)]
pub struct Deletion;

/// Marker type describing a customer enquiry.
#[derive(Clone, Copy, Debug)]
pub struct Enquiry;

/// Marker type describing a contact with a customer.
#[derive(Clone, Copy, Debug)]
pub struct Contact;

/// Marker type describing a scheduled follow-up.
#[derive(Clone, Copy, Debug)]
pub struct FollowUp;

/// Marker type describing a scoring event.
#[derive(Clone, Copy, Debug)]
pub struct Scoring;

/// Marker type describing a document being sent out.
#[derive(Clone, Copy, Debug)]
pub struct Sending;

/// Marker type describing a document being viewed.
#[derive(Clone, Copy, Debug)]
pub struct Viewing;

/// Marker type describing a response to a sent document.
#[derive(Clone, Copy, Debug)]
pub struct Response;

/// Marker type describing a lead conversion.
#[derive(Clone, Copy, Debug)]
pub struct Conversion;

/// Marker type describing a work start.
#[derive(Clone, Copy, Debug)]
pub struct Start;

/// Marker type describing a file upload.
#[derive(Clone, Copy, Debug)]
pub struct Upload;
